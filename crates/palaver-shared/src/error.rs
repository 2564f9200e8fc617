use thiserror::Error;

/// A persisted row or record that could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid message status: {0}")]
    InvalidStatus(String),

    #[error("Conversation id {found} does not match its participants (expected {expected})")]
    ConversationIdMismatch { expected: String, found: String },

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Group {0} has rows with a different name, admin or participant list")]
    InconsistentGroupRow(String),

    #[error("Dangling escape at end of field")]
    DanglingEscape,

    #[error("Unknown escape sequence: \\{0}")]
    UnknownEscape(char),
}
