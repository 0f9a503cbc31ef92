use crate::core::error::ChatError;
use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use serde::Serialize;

pub mod chat;
pub mod models;

pub fn router() -> Router {
    Router::new()
        .nest("/chat", chat::router())
        .nest("/models", models::router())
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

/// Maps a relay error to the response displayed in place of a reply.
pub(crate) fn error_response(err: &ChatError) -> (StatusCode, Json<ErrorBody>) {
    let status = match err {
        ChatError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ChatError::ModelNotFound { .. } => StatusCode::NOT_FOUND,
        ChatError::BackendUnavailable { .. } | ChatError::Backend(_) => StatusCode::BAD_GATEWAY,
    };

    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}
