use schemars::schema_for;
use serde_json::Value;

use crate::models::diagnosis::DiagnosisResponse;

const SCHEMA_EXAMPLE: &str = r#"{"properties": {"items": {"description": "a list of words", "type": "array", "items": {"type": "string"}}}, "required": ["items"]}"#;

/// Builds the text sent to the model for one symptom description.
///
/// The schema section is rendered once, from the same `DiagnosisResponse`
/// type the extractor deserializes into, so the two cannot drift apart.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    format_instructions: String,
}

impl PromptBuilder {
    pub fn new() -> Result<Self, serde_json::Error> {
        Ok(Self {
            format_instructions: format_instructions()?,
        })
    }

    pub fn format_instructions(&self) -> &str {
        &self.format_instructions
    }

    pub fn build(&self, symptom: &str) -> String {
        format!(
            "Based on the symptom, age and gender '{symptom}', provide \
             the corresponding types of doctors to visit. Return JSON strictly in the format: \n\n\
             {}\n\n\
             No additional text or explanations.",
            self.format_instructions
        )
    }
}

/// JSON schema of `DiagnosisResponse` without the meta keys a model has no
/// use for.
fn response_schema() -> Result<String, serde_json::Error> {
    let mut schema = serde_json::to_value(schema_for!(DiagnosisResponse))?;
    if let Value::Object(obj) = &mut schema {
        obj.remove("$schema");
        obj.remove("title");
    }
    Ok(schema.to_string())
}

fn format_instructions() -> Result<String, serde_json::Error> {
    Ok(format!(
        "The output must be a JSON instance that conforms to the JSON schema below.\n\n\
         For example, given the schema {SCHEMA_EXAMPLE}\n\
         the object {{\"items\": [\"alpha\", \"beta\"]}} is a valid instance of the schema, \
         while the object {{\"properties\": {{\"items\": [\"alpha\", \"beta\"]}}}} is not.\n\n\
         Here is the output schema:\n```\n{}\n```",
        response_schema()?
    ))
}
