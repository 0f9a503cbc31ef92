//! Implementations for the service the app needs.
//!

use crate::core::chat::{ChatMessage, ChatTurn};
use crate::core::error::ChatError;
use crate::core::traits::ChatService;
use crate::infrastructure::traits::InferenceBackend;
use async_trait::async_trait;
use di::{Ref, injectable};

#[injectable(ChatService)]
pub struct RelayChatService {
    backend: Ref<dyn InferenceBackend>,
}

#[async_trait]
impl ChatService for RelayChatService {
    async fn complete(
        &self,
        model: &str,
        mut conversation: Vec<ChatMessage>,
        message: String,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        conversation.push(ChatMessage::user(message));

        let reply = self.backend.chat(model, &conversation).await?;
        conversation.push(ChatMessage::assistant(reply));

        Ok(conversation)
    }

    async fn submit(
        &self,
        model: &str,
        mut conversation: Vec<ChatMessage>,
        message: String,
    ) -> Result<ChatTurn, ChatError> {
        conversation.push(ChatMessage::user(message));

        let chunks = self.backend.chat_stream(model, &conversation).await?;

        Ok(ChatTurn {
            conversation,
            chunks,
        })
    }
}
