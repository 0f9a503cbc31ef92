//! Browser chat for a local Ollama server - Library exports for testing
//!
//! (c) Softlandia 2025

pub mod api;
pub mod core;
pub mod infrastructure;

use crate::infrastructure::config::ChatSettings;
use tokio::sync::OnceCell;

pub static SETTINGS: OnceCell<ChatSettings> = OnceCell::const_new();

/// Settings published by `main` before the first request is served.
pub fn settings() -> &'static ChatSettings {
    SETTINGS.get().expect("settings should be set at startup")
}
