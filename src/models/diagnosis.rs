use std::{fmt, marker::PhantomData};

use schemars::JsonSchema;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, Visitor, value::MapAccessDeserializer},
};
use utoipa::ToSchema;

use super::common::ErrorMessage;

/// Inbound body of `POST /diagnosis`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SymptomQuery {
    /// Free-text symptoms, optionally with age and gender.
    #[schema(example = "chest pain, age 45, male")]
    pub symptom: String,
}

// `Deserialize` for the reply types is written by hand: the derived impl
// also accepts the positional array form (`[["Cardiologist"]]`), which is
// not what the schema in the prompt allows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct Diagnosis {
    /// Types of doctor to visit
    #[serde(rename = "type")]
    #[schema(example = json!(["Cardiologist"]))]
    pub specialist_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DiagnosisResponse {
    pub diagnoses: Vec<Diagnosis>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DiagnosisFields {
    #[serde(rename = "type")]
    specialist_types: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DiagnosisResponseFields {
    diagnoses: Vec<Diagnosis>,
}

impl<'de> Deserialize<'de> for Diagnosis {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields: DiagnosisFields = deserialize_object(deserializer)?;
        Ok(Diagnosis {
            specialist_types: fields.specialist_types,
        })
    }
}

impl<'de> Deserialize<'de> for DiagnosisResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields: DiagnosisResponseFields = deserialize_object(deserializer)?;
        Ok(DiagnosisResponse {
            diagnoses: fields.diagnoses,
        })
    }
}

fn deserialize_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    deserializer.deserialize_map(ObjectOnly(PhantomData))
}

struct ObjectOnly<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ObjectOnly<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<T, A::Error> {
        T::deserialize(MapAccessDeserializer::new(map))
    }
}

/// What `/diagnosis` answers with once a model reply came back: either the
/// validated structure or a parsing error, never a mix of both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum DiagnosisOutcome {
    Diagnoses(DiagnosisResponse),
    Error(ErrorMessage),
}

impl DiagnosisOutcome {
    pub fn parsing_error(details: impl fmt::Display) -> Self {
        DiagnosisOutcome::Error(ErrorMessage::new(format!("Parsing error: {details}")))
    }
}
