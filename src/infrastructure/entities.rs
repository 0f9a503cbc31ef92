//! Backend entities

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One installed model, as reported by the backend's tags endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    pub modified_at: Option<DateTime<Utc>>,
}
