use axum::{Router, routing::post};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{AppState, apidoc};

pub mod diagnosis;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/diagnosis", post(diagnosis::diagnose))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", apidoc::ApiDoc::openapi()))
        .with_state(state)
}
