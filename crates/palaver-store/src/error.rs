use std::path::PathBuf;

use palaver_shared::error::RecordError;
use palaver_shared::types::ContainerKind;
use thiserror::Error;

/// Errors produced by the store layer.
///
/// Every variant is recoverable: the caller reports it and carries on.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No identity is registered under this id.
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    /// Registration with an id that is already taken.
    #[error("User already exists: {0}")]
    AlreadyExists(String),

    /// A mutating operation was attempted with nobody logged in.
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Unknown receiver: {0}")]
    UnknownReceiver(String),

    #[error("Cannot send a message to yourself")]
    SelfMessage,

    /// A group was created with a member that is not registered.
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    #[error("Unknown {kind}: {id}")]
    UnknownContainer { kind: ContainerKind, id: String },

    #[error("Not a member of group {0}")]
    NotGroupMember(String),

    /// The active identity does not belong to the addressed container.
    #[error("Not a participant of {0}")]
    NotAParticipant(String),

    /// A message whose sender is not part of the container it was added to.
    #[error("Sender {sender} is not a participant of {container}")]
    SenderNotParticipant { sender: String, container: String },

    /// A stored conversation id that is derived from a different pair.
    #[error("Conversation {0} belongs to another pair of users")]
    ConversationConflict(String),

    #[error("Unknown message: {0}")]
    UnknownMessage(String),

    /// Only the group admin may do this.
    #[error("Not authorized: only the group admin can do this")]
    NotAuthorized,

    #[error("Already a member: {0}")]
    AlreadyMember(String),

    #[error("Not a member: {0}")]
    NotMember(String),

    #[error("The group admin cannot be removed")]
    CannotRemoveAdmin,

    /// An id or name that cannot be stored (empty, blank or ambiguous).
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: &'static str },

    /// Reading or writing a table failed. In-memory state is kept as is.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted row could not be decoded.
    #[error("Corrupt row in {} at line {line}: {source}", .file.display())]
    Corrupt {
        file: PathBuf,
        line: usize,
        #[source]
        source: RecordError,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
