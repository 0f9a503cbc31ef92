//! Installed model listing

use crate::api::error_response;
use crate::infrastructure::traits::InferenceBackend;
use crate::settings;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new().route("/", get(list_models))
}

async fn list_models(Inject(backend): Inject<dyn InferenceBackend>) -> Response {
    match backend.list_models().await {
        Ok(models) => (
            StatusCode::OK,
            Json(schemas::ModelList {
                default_model: settings().model.clone(),
                models: models.into_iter().map(schemas::Model::from).collect(),
            }),
        )
            .into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

pub mod schemas {
    use crate::infrastructure::entities::ModelInfo;
    use chrono::{DateTime, Utc};
    use serde::Serialize;

    #[derive(Serialize, Debug)]
    pub struct ModelList {
        pub default_model: String,
        pub models: Vec<Model>,
    }

    #[derive(Serialize, Debug)]
    pub struct Model {
        pub name: String,
        pub display_name: String,
        pub size: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub modified_at: Option<DateTime<Utc>>,
    }

    impl From<ModelInfo> for Model {
        fn from(model: ModelInfo) -> Model {
            let display_name = display_name(&model.name);
            Model {
                name: model.name,
                display_name,
                size: model.size,
                modified_at: model.modified_at,
            }
        }
    }

    /// Label for the UI model selector, e.g. `deepseek-r1:4b` becomes
    /// `Deepseek R1 (4b)`. A `:latest` tag is dropped entirely.
    pub fn display_name(name: &str) -> String {
        let name = name.strip_suffix(":latest").unwrap_or(name);
        let (base, version) = match name.split_once(':') {
            Some((base, version)) => (base, Some(version)),
            None => (name, None),
        };

        let capitalized = base
            .replace('-', " ")
            .split_whitespace()
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ");

        match version {
            Some(version) => format!("{capitalized} ({version})"),
            None => capitalized,
        }
    }

    fn capitalize(word: &str) -> String {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::schemas::display_name;

    #[test]
    fn test_display_name_with_version_tag() {
        assert_eq!(display_name("gemma3:1b"), "Gemma3 (1b)");
        assert_eq!(display_name("deepseek-r1:4b"), "Deepseek R1 (4b)");
    }

    #[test]
    fn test_display_name_drops_latest_tag() {
        assert_eq!(display_name("llama3.2:latest"), "Llama3.2");
    }

    #[test]
    fn test_display_name_without_tag() {
        assert_eq!(display_name("mistral"), "Mistral");
    }
}
