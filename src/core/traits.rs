//! DI "Interfaces"

use crate::core::chat::{ChatMessage, ChatTurn};
use crate::core::error::ChatError;
use async_trait::async_trait;

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Relays one user message to the backend and waits for the full reply.
    ///
    /// Appends `message` as a user entry, sends the conversation to `model`,
    /// appends the reply as an assistant entry and returns the updated
    /// conversation. The conversation is left untouched on error.
    async fn complete(
        &self,
        model: &str,
        conversation: Vec<ChatMessage>,
        message: String,
    ) -> Result<Vec<ChatMessage>, ChatError>;

    /// Streaming variant of [`ChatService::complete`].
    ///
    /// Returns once the backend has accepted the request; the reply arrives
    /// as chunks on the turn's channel.
    async fn submit(
        &self,
        model: &str,
        conversation: Vec<ChatMessage>,
        message: String,
    ) -> Result<ChatTurn, ChatError>;
}
