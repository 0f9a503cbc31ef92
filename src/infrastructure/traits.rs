//! Infrastructure traits, used for DI on higher levels

use crate::core::chat::ChatMessage;
use crate::core::error::ChatError;
use crate::infrastructure::entities::ModelInfo;
use async_trait::async_trait;
use tokio::sync::mpsc;

#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Sends the conversation to `model` and returns the full reply.
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ChatError>;

    /// Streaming variant: reply chunks arrive on the returned channel until
    /// the backend reports the generation is done.
    async fn chat_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<mpsc::Receiver<String>, ChatError>;

    /// Lists the models installed on the backend.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ChatError>;
}
