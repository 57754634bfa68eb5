use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value as JsonValue;
use tracing::{error, info};

use crate::{
    AppState, handlers,
    models::{
        common::ErrorMessage,
        diagnosis::{DiagnosisOutcome, SymptomQuery},
    },
};

#[utoipa::path(
    post,
    path = "/diagnosis",
    tag = "diagnosis",
    request_body = SymptomQuery,
    responses(
        (status = 200, description = "Specialist categories, or a parsing error when the model reply did not fit the schema", body = DiagnosisOutcome),
        (status = 400, description = "Missing symptom parameter", body = ErrorMessage),
        (status = 500, description = "Model call failed")
    )
)]
pub async fn diagnose(
    State(state): State<AppState>,
    payload: Option<Json<JsonValue>>,
) -> Result<Response, (StatusCode, String)> {
    // Anything without a non-empty string `symptom` is a bad request,
    // including bodies that are not JSON objects at all.
    let Some(SymptomQuery { symptom }) =
        payload.as_ref().and_then(|Json(body)| symptom_query(body))
    else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ErrorMessage::new("Missing symptom parameter")),
        )
            .into_response());
    };

    info!("Incoming diagnosis request (symptom_len={})", symptom.len());

    let outcome = handlers::diagnosis::get_diagnosis(&state, &symptom)
        .await
        .map_err(|e| {
            error!("diagnosis failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("handler error: {e}"),
            )
        })?;

    // Parsing errors are deliberately reported with 200.
    Ok(Json(outcome).into_response())
}

fn symptom_query(body: &JsonValue) -> Option<SymptomQuery> {
    body.get("symptom")
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| SymptomQuery {
            symptom: s.to_string(),
        })
}
