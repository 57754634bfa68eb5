use thiserror::Error;
use tracing::debug;

use crate::{
    AppState,
    models::diagnosis::DiagnosisOutcome,
    services::{extractor, llm::LlmError},
};

#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),
}

/// Prompt, one model call, strict extraction. Only upstream failures are
/// returned as `Err`; a reply that does not fit the schema is an `Ok` error
/// outcome.
pub async fn get_diagnosis(
    state: &AppState,
    symptom: &str,
) -> Result<DiagnosisOutcome, DiagnosisError> {
    let prompt = state.prompt.build(symptom);
    let completion = state.llm.complete(&prompt).await?;

    let outcome = extractor::extract(&completion);
    if let DiagnosisOutcome::Error(e) = &outcome {
        debug!("model reply rejected: {}", e.error);
    }
    Ok(outcome)
}
