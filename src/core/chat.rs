//! Chat messages and conversation turns.
//!

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One entry of the conversation shown in the UI.
///
/// Serializes to the `{role, content}` shape the Ollama chat API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Result of submitting one user message for streaming.
///
/// `conversation` already ends with the user message that started the turn;
/// the assistant's reply arrives chunk by chunk on `chunks` until the sender
/// side completes.
#[derive(Debug)]
pub struct ChatTurn {
    pub conversation: Vec<ChatMessage>,
    pub chunks: mpsc::Receiver<String>,
}
