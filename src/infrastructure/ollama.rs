//! Ollama HTTP client

use crate::core::chat::ChatMessage;
use crate::core::error::ChatError;
use crate::infrastructure::entities::ModelInfo;
use crate::infrastructure::traits::InferenceBackend;
use async_trait::async_trait;
use di::inject;
use di::injectable;
use futures_util::StreamExt;
use log::{debug, error};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatMessage,
}

#[derive(Deserialize)]
struct OllamaChatMessage {
    content: String,
}

/// One NDJSON line of a streamed chat response.
#[derive(Deserialize)]
struct OllamaChatChunk {
    message: Option<OllamaChatMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct OllamaErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<ModelInfo>,
}

pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
}

#[injectable(InferenceBackend)]
impl OllamaBackend {
    #[inject]
    pub fn create() -> OllamaBackend {
        OllamaBackend::new(&crate::settings().host_url)
    }
}

impl OllamaBackend {
    pub fn new(base_url: &str) -> OllamaBackend {
        OllamaBackend {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    async fn send_chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response, ChatError> {
        let url = format!("{}/api/chat", self.base_url);
        let request = OllamaChatRequest {
            model,
            messages,
            stream,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;

        check_status(model, response).await
    }

    fn unavailable(&self, source: reqwest::Error) -> ChatError {
        ChatError::BackendUnavailable {
            url: self.base_url.clone(),
            reason: source.to_string(),
        }
    }
}

/// Maps a non-success status to the matching error kind. Ollama answers 404
/// for a model that is not installed and puts details in an `error` field.
async fn check_status(
    model: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ChatError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ChatError::ModelNotFound {
            model: model.to_owned(),
        });
    }

    let detail = match response.json::<OllamaErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => format!("backend returned status {status}"),
    };
    Err(ChatError::Backend(detail))
}

/// Parses one NDJSON line of the chat stream into its content chunk and the
/// `done` flag. Blank and malformed lines are skipped.
fn parse_chunk(line: &[u8]) -> Option<(String, bool)> {
    let line = std::str::from_utf8(line).ok()?.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<OllamaChatChunk>(line) {
        Ok(chunk) => {
            let content = chunk.message.map(|m| m.content).unwrap_or_default();
            Some((content, chunk.done))
        }
        Err(e) => {
            debug!("skipping malformed stream line: {e}");
            None
        }
    }
}

#[async_trait]
impl InferenceBackend for OllamaBackend {
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let response = self.send_chat(model, messages, false).await?;

        let response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Backend(format!("unexpected response format: {e}")))?;

        Ok(response.message.content)
    }

    async fn chat_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<mpsc::Receiver<String>, ChatError> {
        let response = self.send_chat(model, messages, true).await?;

        let (sender, receiver) = mpsc::channel::<String>(1000);

        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut pending: Vec<u8> = Vec::new();

            'read: while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        error!("chat stream aborted: {e}");
                        break;
                    }
                };

                pending.extend_from_slice(&chunk);
                while let Some(newline) = pending.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = pending.drain(..=newline).collect();
                    if let Some((content, done)) = parse_chunk(&line) {
                        if !content.is_empty() && sender.send(content).await.is_err() {
                            // Receiver dropped, the client went away.
                            break 'read;
                        }
                        if done {
                            break 'read;
                        }
                    }
                }
            }
        });

        Ok(receiver)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ChatError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;

        if !response.status().is_success() {
            return Err(ChatError::Backend(format!(
                "failed to list models: {}",
                response.status()
            )));
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Backend(format!("unexpected response format: {e}")))?;

        Ok(tags.models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chunk_with_content() {
        let line = br#"{"model":"gemma3:1b","message":{"role":"assistant","content":"hi "},"done":false}"#;
        let (content, done) = parse_chunk(line).unwrap();
        assert_eq!(content, "hi ");
        assert!(!done);
    }

    #[test]
    fn test_parse_chunk_final_line() {
        let line = br#"{"model":"gemma3:1b","message":{"role":"assistant","content":""},"done":true,"total_duration":12345}"#;
        let (content, done) = parse_chunk(line).unwrap();
        assert_eq!(content, "");
        assert!(done);
    }

    #[test]
    fn test_parse_chunk_without_message_field() {
        let line = br#"{"model":"gemma3:1b","done":true}"#;
        let (content, done) = parse_chunk(line).unwrap();
        assert_eq!(content, "");
        assert!(done);
    }

    #[test]
    fn test_parse_chunk_skips_blank_and_malformed_lines() {
        assert!(parse_chunk(b"\n").is_none());
        assert!(parse_chunk(b"   ").is_none());
        assert!(parse_chunk(b"not json").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = OllamaBackend::new("http://localhost:11434/");
        assert_eq!(backend.base_url, "http://localhost:11434");
    }
}
