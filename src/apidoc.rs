use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Specialist Triage",
        version = "0.1.0",
        description = "Maps a free-text symptom description to the types of medical specialist worth visiting, using an LLM with a fixed output schema."
    ),
    servers(
        (url = "http://localhost:5000", description = "Local dev")
    ),
    tags(
        (name = "diagnosis", description = "Symptom to specialist lookup")
    ),
    paths(
        crate::routes::diagnosis::diagnose,
    ),
    components(
        schemas(
            crate::models::diagnosis::SymptomQuery,
            crate::models::diagnosis::Diagnosis,
            crate::models::diagnosis::DiagnosisResponse,
            crate::models::diagnosis::DiagnosisOutcome,
            crate::models::common::ErrorMessage
        )
    )
)]
pub struct ApiDoc;
