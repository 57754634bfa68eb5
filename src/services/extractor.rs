use thiserror::Error;

use crate::models::diagnosis::{DiagnosisOutcome, DiagnosisResponse};

#[derive(Debug, Error)]
#[error("Failed to parse DiagnosisResponse from completion {completion}. Got: {source}")]
pub struct ParseError {
    completion: String,
    #[source]
    source: serde_json::Error,
}

/// Strict parse of a model reply into `DiagnosisResponse`.
pub fn parse_diagnosis(completion: &str) -> Result<DiagnosisResponse, ParseError> {
    serde_json::from_str(strip_code_fence(completion)).map_err(|source| ParseError {
        completion: completion.to_string(),
        source,
    })
}

/// Parse failures become an `error` outcome instead of propagating.
pub fn extract(completion: &str) -> DiagnosisOutcome {
    match parse_diagnosis(completion) {
        Ok(resp) => DiagnosisOutcome::Diagnoses(resp),
        Err(e) => DiagnosisOutcome::parsing_error(e),
    }
}

// Models like to wrap JSON in ```json fences even when told not to.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // drop the info string (e.g. `json`) on the opening line
    match inner.find('\n') {
        Some(idx) => inner[idx + 1..].trim(),
        None => inner.trim(),
    }
}
