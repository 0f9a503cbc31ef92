//! Error kinds surfaced to the UI.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing or empty model configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The local inference service could not be reached.
    #[error("could not connect to the inference backend at {url}: {reason}")]
    BackendUnavailable { url: String, reason: String },

    /// The backend rejected the requested model name.
    #[error("model `{model}` is not available on the backend")]
    ModelNotFound { model: String },

    /// The backend answered, but not with anything usable.
    #[error("inference backend error: {0}")]
    Backend(String),
}
