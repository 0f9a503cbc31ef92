//! Chat relay endpoint

use crate::api::{ErrorBody, error_response};
use crate::core::chat::ChatMessage;
use crate::core::traits::ChatService;
use crate::settings;
use async_stream::stream;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive};
use axum::response::{IntoResponse, Response, Sse};
use axum::routing::post;
use axum::{Json, Router};
use di::Ref;
use di_axum::Inject;
use std::time::Duration;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new().route("/", post(post_chat))
}

async fn post_chat(
    Inject(chat_service): Inject<dyn ChatService>,
    Json(request): Json<schemas::ChatRequest>,
) -> Response {
    if request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "message must not be empty".to_owned(),
            }),
        )
            .into_response();
    }

    let model = request
        .model
        .unwrap_or_else(|| settings().model.clone());

    if request.stream {
        stream_reply(chat_service, model, request.messages, request.message).await
    } else {
        match chat_service
            .complete(&model, request.messages, request.message)
            .await
        {
            Ok(conversation) => (
                StatusCode::OK,
                Json(schemas::ChatResponse {
                    model,
                    messages: conversation
                        .into_iter()
                        .map(schemas::Message::from)
                        .collect(),
                }),
            )
                .into_response(),
            Err(err) => error_response(&err).into_response(),
        }
    }
}

/// Relays one turn as server-sent events: the echoed user message, the reply
/// chunk by chunk, then the completed assistant message.
async fn stream_reply(
    chat_service: Ref<dyn ChatService>,
    model: String,
    conversation: Vec<ChatMessage>,
    message: String,
) -> Response {
    let mut turn = match chat_service.submit(&model, conversation, message).await {
        Ok(turn) => turn,
        Err(err) => return error_response(&err).into_response(),
    };

    let user_message = turn
        .conversation
        .last()
        .cloned()
        .expect("turn should end with the user message");
    let message_id = Uuid::new_v4();

    let stream = stream! {
        yield Ok::<_, &'static str>(
            Event::default()
                .event("new_message")
                .json_data(schemas::Message::from(user_message))
                .expect("user message should serialize"),
        );

        let mut assistant_message = String::new();

        while let Some(part) = turn.chunks.recv().await {
            assistant_message.push_str(&part);
            yield Ok(Event::default()
                .event("message_part")
                .retry(Duration::from_millis(100))
                .json_data(schemas::MessagePart {
                    message_id,
                    content: part,
                })
                .expect("message part should serialize"));
        }

        yield Ok(Event::default()
            .event("done")
            .json_data(schemas::Message::assistant_with_id(message_id, assistant_message))
            .expect("assistant message should serialize"));
    };

    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

pub mod schemas {
    use crate::core::chat::{ChatMessage, Role};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    fn default_stream() -> bool {
        true
    }

    #[derive(Deserialize, Debug)]
    pub struct ChatRequest {
        /// Conversation so far, oldest entry first.
        #[serde(default)]
        pub messages: Vec<ChatMessage>,
        /// The new user message.
        pub message: String,
        /// Overrides the configured default model for this request.
        pub model: Option<String>,
        #[serde(default = "default_stream")]
        pub stream: bool,
    }

    #[derive(Serialize, Debug)]
    pub struct ChatResponse {
        pub model: String,
        pub messages: Vec<Message>,
    }

    #[derive(Serialize, Debug)]
    pub struct Message {
        pub id: Uuid,
        pub role: Role,
        pub content: String,
        pub created_at: DateTime<Utc>,
    }

    impl Message {
        pub fn assistant_with_id(id: Uuid, content: String) -> Message {
            Message {
                id,
                role: Role::Assistant,
                content,
                created_at: Utc::now(),
            }
        }
    }

    impl From<ChatMessage> for Message {
        fn from(message: ChatMessage) -> Message {
            Message {
                id: Uuid::new_v4(),
                role: message.role,
                content: message.content,
                created_at: Utc::now(),
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct MessagePart {
        pub message_id: Uuid,
        pub content: String,
    }
}
