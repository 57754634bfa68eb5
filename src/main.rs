mod apidoc;
mod config;
mod handlers;
mod models;
mod routes;
mod services;

use std::sync::Arc;

use config::Config;
use services::{
    llm::{CompletionClient, GeminiClient},
    prompt::PromptBuilder,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone)]
pub struct AppState {
    pub prompt: Arc<PromptBuilder>,
    pub llm: Arc<dyn CompletionClient>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::from_env().expect("Failed to load configuration");
    let addr = format!("{}:{}", cfg.app_host, cfg.app_port);

    let llm = GeminiClient::new(reqwest::Client::new(), &cfg)
        .expect("Failed to build Gemini client");

    // Built once; shared read-only by every request.
    let prompt = PromptBuilder::new().expect("Failed to render output schema");
    tracing::debug!("format instructions: {}", prompt.format_instructions());

    let state = AppState {
        prompt: Arc::new(prompt),
        llm: Arc::new(llm),
    };

    let app = routes::router(state);

    let listener = TcpListener::bind(&addr).await.expect("Failed to bind listener");

    tracing::info!(
        "Specialist triage listening on http://{addr} (model={})",
        cfg.gemini_model
    );
    axum::serve(listener, app).await.expect("Server error");
}
