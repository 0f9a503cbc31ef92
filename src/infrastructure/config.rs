//! Startup configuration from the environment

use crate::core::error::ChatError;
use std::env;

pub const MODEL_ENV: &str = "OLLAMA_MODEL";
pub const HOST_URL_ENV: &str = "OLLAMA_HOST_URL";

const DEFAULT_HOST_URL: &str = "http://localhost:11434";

/// Immutable settings read once at process start.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Model name sent with every inference request.
    pub model: String,
    /// Base URL of the Ollama server, without a trailing slash.
    pub host_url: String,
}

impl ChatSettings {
    /// Reads the settings from the environment (and a `.env` file, if any).
    ///
    /// The model name is required and returned exactly as configured; the
    /// host URL falls back to the default Ollama address.
    pub fn from_env() -> Result<ChatSettings, ChatError> {
        dotenvy::dotenv().ok();

        let model = env::var(MODEL_ENV)
            .map_err(|_| ChatError::Configuration(format!("{MODEL_ENV} is not set")))?;
        if model.trim().is_empty() {
            return Err(ChatError::Configuration(format!("{MODEL_ENV} is empty")));
        }

        let host_url = env::var(HOST_URL_ENV).unwrap_or_else(|_| DEFAULT_HOST_URL.to_owned());

        Ok(ChatSettings {
            model,
            host_url: host_url.trim_end_matches('/').to_owned(),
        })
    }
}
