use anyhow::{Context, Result};

/// Default base URL of the local OpenAI-compatible inference server
/// (LM Studio / llama.cpp style).
pub const DEFAULT_MODEL_BASE_URL: &str = "http://127.0.0.1:1234";

/// Default model identifier sent with every completion request.
pub const DEFAULT_MODEL_NAME: &str = "qwen/qwen3-4b-2507";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub model_base_url: String,
    pub model_name: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            model_base_url: std::env::var("MODEL_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_MODEL_BASE_URL.to_string()),
            model_name: std::env::var("MODEL_NAME")
                .unwrap_or_else(|_| DEFAULT_MODEL_NAME.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
