use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("gemini status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("gemini returned no text")]
    EmptyResponse,
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Single-turn text completion: prompt in, raw reply text out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, cfg: &Config) -> Result<Self, LlmError> {
        let endpoint = cfg
            .gemini_base_url
            .join(&format!("v1beta/models/{}:generateContent", cfg.gemini_model))?;
        Ok(Self {
            http,
            endpoint,
            api_key: cfg.google_api_key.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let res = self
            .http
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(LlmError::Status { status, body });
        }

        let reply: GenerateContentResponse = res.json().await?;
        let text = reply_text(reply)?;
        debug!("gemini replied with {} bytes", text.len());
        Ok(text)
    }
}

/// Joins the text parts of the first candidate.
fn reply_text(reply: GenerateContentResponse) -> Result<String, LlmError> {
    let text: String = reply
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::{Path, State},
        http::HeaderMap,
        routing::post,
    };
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;

    fn response(v: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let reply = response(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [
                    {"text": "{\"diagnoses\": "},
                    {"text": "[]}"}
                ]}, "finishReason": "STOP"},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"totalTokenCount": 12}
        }));

        assert_eq!(reply_text(reply).unwrap(), "{\"diagnoses\": []}");
    }

    #[test]
    fn no_candidates_is_an_error() {
        let reply = response(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        assert!(matches!(reply_text(reply), Err(LlmError::EmptyResponse)));

        let reply = response(json!({"candidates": [{"finishReason": "SAFETY"}]}));
        assert!(matches!(reply_text(reply), Err(LlmError::EmptyResponse)));
    }

    fn config(base_url: Url, model: &str) -> Config {
        Config {
            app_host: "127.0.0.1".into(),
            app_port: 5000,
            google_api_key: "test-key".into(),
            gemini_model: model.into(),
            gemini_base_url: base_url,
        }
    }

    #[test]
    fn endpoint_is_built_from_config() {
        let cfg = config(
            Url::parse("https://generativelanguage.googleapis.com/").unwrap(),
            "gemini-1.5-pro",
        );
        let client = GeminiClient::new(reqwest::Client::new(), &cfg).unwrap();

        assert_eq!(
            client.endpoint.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn request_body_is_single_user_turn() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".into(),
                parts: vec![Part {
                    text: Some("hello".into()),
                }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})
        );
    }

    /* ------------------- generateContent over HTTP ------------------- */

    #[derive(Debug, Clone)]
    struct SeenRequest {
        call: String,
        api_key: Option<String>,
        body: serde_json::Value,
    }

    #[derive(Clone)]
    struct Stub {
        status: StatusCode,
        reply: serde_json::Value,
        seen: Arc<Mutex<Vec<SeenRequest>>>,
    }

    async fn generate_content(
        State(stub): State<Stub>,
        Path(call): Path<String>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        stub.seen.lock().unwrap().push(SeenRequest {
            call,
            api_key: headers
                .get("x-goog-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body,
        });
        (stub.status, Json(stub.reply.clone()))
    }

    async fn serve_stub(stub: Stub) -> Url {
        let app = Router::new()
            .route("/v1beta/models/:call", post(generate_content))
            .with_state(stub);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn stub_with(status: StatusCode, reply: serde_json::Value) -> Stub {
        Stub {
            status,
            reply,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn test_client(base: Url) -> GeminiClient {
        GeminiClient::new(reqwest::Client::new(), &config(base, "gemini-test")).unwrap()
    }

    #[tokio::test]
    async fn complete_posts_prompt_with_api_key() {
        let stub = stub_with(
            StatusCode::OK,
            json!({
                "candidates": [{"content": {"role": "model", "parts": [
                    {"text": "{\"diagnoses\":[{\"type\":[\"Cardiologist\"]}]}"}
                ]}}]
            }),
        );
        let seen = stub.seen.clone();
        let base = serve_stub(stub).await;
        let client = test_client(base);

        let text = client.complete("chest pain, age 45, male").await.unwrap();

        assert_eq!(text, r#"{"diagnoses":[{"type":["Cardiologist"]}]}"#);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].call, "gemini-test:generateContent");
        assert_eq!(seen[0].api_key.as_deref(), Some("test-key"));
        assert_eq!(
            seen[0].body,
            json!({"contents": [{"role": "user", "parts": [{"text": "chest pain, age 45, male"}]}]})
        );
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let stub = stub_with(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"code": 429, "message": "quota exceeded"}}),
        );
        let base = serve_stub(stub).await;
        let client = test_client(base);

        let err = client.complete("cough").await.unwrap_err();

        match err {
            LlmError::Status { status, body } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert!(body.contains("quota exceeded"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blocked_prompt_is_an_empty_response() {
        let stub = stub_with(
            StatusCode::OK,
            json!({"promptFeedback": {"blockReason": "SAFETY"}}),
        );
        let base = serve_stub(stub).await;
        let client = test_client(base);

        assert!(matches!(
            client.complete("cough").await,
            Err(LlmError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let base = Url::parse(&format!("http://{addr}/")).unwrap();
        let client = test_client(base);

        assert!(matches!(
            client.complete("cough").await,
            Err(LlmError::Request(_))
        ));
    }
}
