use serde_json::{json, Value};
use thiserror::Error;

use palaver_store::StoreError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid container kind: {0} (expected dm or group)")]
    InvalidKind(String),

    #[error("No conversation with {0}")]
    NoConversation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// The `{"error": …}` line printed for a failed command.
    pub fn to_json(&self) -> Value {
        json!({
            "error": self.to_string(),
        })
    }
}
