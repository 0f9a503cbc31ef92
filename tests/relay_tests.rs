//! Chat relay tests
//!
//! Exercises the relay service against a fake inference backend registered
//! through the same DI wiring production uses.
//!
//! Tests are serialized because the fake backend records its calls in a
//! shared log.

use async_trait::async_trait;
use di::{Injectable, Ref, ServiceCollection, inject, injectable};
use local_llm_chat::core::chat::{ChatMessage, Role};
use local_llm_chat::core::error::ChatError;
use local_llm_chat::core::services::RelayChatService;
use local_llm_chat::core::traits::ChatService;
use local_llm_chat::infrastructure::entities::ModelInfo;
use local_llm_chat::infrastructure::traits::InferenceBackend;
use serial_test::serial;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// What the fake backend was asked, per call: (model, conversation).
static CALLS: Mutex<Vec<(String, Vec<ChatMessage>)>> = Mutex::new(Vec::new());

fn recorded_calls() -> Vec<(String, Vec<ChatMessage>)> {
    CALLS.lock().unwrap().clone()
}

fn reset_calls() {
    CALLS.lock().unwrap().clear();
}

/// Backend stand-in keyed on the model name: `bogus` is not installed,
/// `offline` cannot be reached, anything else replies "hi there".
pub struct FakeBackend;

#[injectable(InferenceBackend)]
impl FakeBackend {
    #[inject]
    pub fn create() -> FakeBackend {
        FakeBackend
    }
}

fn fake_failure(model: &str) -> Option<ChatError> {
    match model {
        "bogus" => Some(ChatError::ModelNotFound {
            model: model.to_owned(),
        }),
        "offline" => Some(ChatError::BackendUnavailable {
            url: "http://localhost:11434".to_owned(),
            reason: "connection refused".to_owned(),
        }),
        _ => None,
    }
}

#[async_trait]
impl InferenceBackend for FakeBackend {
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ChatError> {
        CALLS
            .lock()
            .unwrap()
            .push((model.to_owned(), messages.to_vec()));

        match fake_failure(model) {
            Some(err) => Err(err),
            None => Ok("hi there".to_owned()),
        }
    }

    async fn chat_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<mpsc::Receiver<String>, ChatError> {
        CALLS
            .lock()
            .unwrap()
            .push((model.to_owned(), messages.to_vec()));

        if let Some(err) = fake_failure(model) {
            return Err(err);
        }

        let (sender, receiver) = mpsc::channel(8);
        tokio::spawn(async move {
            for part in ["hi ", "there"] {
                if sender.send(part.to_owned()).await.is_err() {
                    break;
                }
            }
        });
        Ok(receiver)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ChatError> {
        Ok(vec![ModelInfo {
            name: "gemma3:1b".to_owned(),
            size: 815_319_791,
            modified_at: None,
        }])
    }
}

fn create_relay() -> Ref<dyn ChatService> {
    let provider = ServiceCollection::new()
        .add(FakeBackend::singleton())
        .add(RelayChatService::scoped())
        .build_provider()
        .unwrap();

    provider.get_required::<dyn ChatService>()
}

#[tokio::test]
#[serial]
async fn test_complete_appends_user_then_assistant() {
    reset_calls();
    let relay = create_relay();

    let conversation = relay
        .complete("gemma3:1b", Vec::new(), "hello".to_owned())
        .await
        .unwrap();

    assert_eq!(
        conversation,
        vec![
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi there")
        ]
    );

    // The backend saw exactly the conversation with the user entry appended.
    let calls = recorded_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "gemma3:1b");
    assert_eq!(calls[0].1, vec![ChatMessage::user("hello")]);
}

#[tokio::test]
#[serial]
async fn test_complete_preserves_prior_entries_in_order() {
    reset_calls();
    let relay = create_relay();
    let prior = vec![
        ChatMessage::user("hello"),
        ChatMessage::assistant("hi there"),
    ];

    let conversation = relay
        .complete("gemma3:1b", prior.clone(), "how are you?".to_owned())
        .await
        .unwrap();

    assert_eq!(conversation.len(), 4);
    assert_eq!(&conversation[..2], &prior[..]);
    assert_eq!(conversation[2], ChatMessage::user("how are you?"));
    assert_eq!(conversation[3].role, Role::Assistant);
}

#[tokio::test]
#[serial]
async fn test_unreachable_backend_adds_no_assistant_entry() {
    reset_calls();
    let relay = create_relay();

    let err = relay
        .complete("offline", Vec::new(), "hello".to_owned())
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::BackendUnavailable { .. }));

    // Only the appended user entry ever reached the backend.
    let calls = recorded_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, vec![ChatMessage::user("hello")]);
}

#[tokio::test]
#[serial]
async fn test_unknown_model_is_model_not_found() {
    reset_calls();
    let relay = create_relay();

    let err = relay
        .complete("bogus", Vec::new(), "hello".to_owned())
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::ModelNotFound { model } if model == "bogus"));
}

#[tokio::test]
#[serial]
async fn test_submit_streams_chunks_after_user_entry() {
    reset_calls();
    let relay = create_relay();

    let mut turn = relay
        .submit("gemma3:1b", Vec::new(), "hello".to_owned())
        .await
        .unwrap();

    assert_eq!(turn.conversation, vec![ChatMessage::user("hello")]);

    let mut reply = String::new();
    while let Some(part) = turn.chunks.recv().await {
        reply.push_str(&part);
    }
    assert_eq!(reply, "hi there");
}

#[tokio::test]
#[serial]
async fn test_submit_failure_keeps_prior_conversation_intact() {
    reset_calls();
    let relay = create_relay();

    let err = relay
        .submit(
            "offline",
            vec![ChatMessage::user("earlier")],
            "hello".to_owned(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::BackendUnavailable { .. }));

    let calls = recorded_calls();
    assert_eq!(
        calls[0].1,
        vec![ChatMessage::user("earlier"), ChatMessage::user("hello")]
    );
}
