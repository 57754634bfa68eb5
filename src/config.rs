use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind host (e.g., 0.0.0.0)
    pub app_host: String,
    /// HTTP bind port (e.g., 5000)
    pub app_port: u16,

    /// Gemini API key, sent as `x-goog-api-key`
    pub google_api_key: String,
    /// Model name (e.g., gemini-1.5-pro)
    pub gemini_model: String,
    /// Gemini API base URL (e.g., https://generativelanguage.googleapis.com/)
    pub gemini_base_url: Url,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid URL for {name}: {value}")]
    InvalidUrl { name: &'static str, value: String },
    #[error("Invalid number for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env if present
        let _ = dotenv();

        let app_host = env_or_default("APP_HOST", "0.0.0.0");
        let app_port = parse_or_default::<u16>("APP_PORT", 5000)?;

        let google_api_key = required("GOOGLE_API_KEY")?;
        let gemini_model = env_or_default("GEMINI_MODEL", "gemini-1.5-pro");
        let gemini_base_url =
            parse_url_or_default("GEMINI_BASE_URL", "https://generativelanguage.googleapis.com/")?;

        Ok(Self {
            app_host,
            app_port,
            google_api_key,
            gemini_model,
            gemini_base_url,
        })
    }
}

/* --------------------------- helpers --------------------------- */

fn env_or_default(key: &'static str, default: &'static str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(key)),
    }
}

fn parse_or_default<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(v) => v.parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            name: key,
            value: v,
        }),
        Err(_) => Ok(default),
    }
}

fn parse_url_or_default(key: &'static str, default: &'static str) -> Result<Url, ConfigError> {
    let raw = env_or_default(key, default);
    Url::parse(&raw).map_err(|_| ConfigError::InvalidUrl {
        name: key,
        value: raw,
    })
}
