//! Domain models held by the store.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a UI layer.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use palaver_shared::types::MessageStatus;

use crate::error::{Result, StoreError};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A registered user. The id is the stable key; the name is fixed at
/// registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message.
///
/// Content, sender and timestamp never change after construction; only the
/// like set and the delivery status do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    id: String,
    sender_id: String,
    content: String,
    /// Whole seconds, matching the epoch-second wire format.
    created_at: DateTime<Utc>,
    /// User ids in the order they liked the message, without duplicates.
    liked_by: Vec<String>,
    status: MessageStatus,
}

impl Message {
    /// Create a freshly sent message stamped with the current time.
    pub fn new(id: impl Into<String>, sender_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sender_id: sender_id.into(),
            content: content.into(),
            created_at: Utc::now().trunc_subsecs(0),
            liked_by: Vec::new(),
            status: MessageStatus::Sent,
        }
    }

    /// Rebuild a message from persisted parts. Duplicate likes are dropped.
    pub fn from_parts(
        id: String,
        sender_id: String,
        content: String,
        created_at: DateTime<Utc>,
        status: MessageStatus,
        liked_by: Vec<String>,
    ) -> Self {
        let mut message = Self {
            id,
            sender_id,
            content,
            created_at,
            liked_by: Vec::with_capacity(liked_by.len()),
            status,
        };
        for user_id in liked_by {
            message.like(&user_id);
        }
        message
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> MessageStatus {
        self.status
    }

    pub fn set_status(&mut self, status: MessageStatus) {
        self.status = status;
    }

    pub fn liked_by(&self) -> &[String] {
        &self.liked_by
    }

    pub fn like_count(&self) -> usize {
        self.liked_by.len()
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.liked_by.iter().any(|u| u == user_id)
    }

    /// Returns `true` if the like was added, `false` if it was already there.
    pub fn like(&mut self, user_id: &str) -> bool {
        if self.is_liked_by(user_id) {
            return false;
        }
        self.liked_by.push(user_id.to_string());
        true
    }

    /// Returns `true` if a like was removed.
    pub fn unlike(&mut self, user_id: &str) -> bool {
        match self.liked_by.iter().position(|u| u == user_id) {
            Some(index) => {
                self.liked_by.remove(index);
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Message log (conversation or group)
// ---------------------------------------------------------------------------

/// Behaviour shared by both kinds of container: an ordered, append-only
/// message log guarded by a participant set.
pub trait MessageLog {
    /// Id of the container, as used for lookups and on disk.
    fn log_id(&self) -> &str;

    fn is_participant(&self, user_id: &str) -> bool;

    /// Messages in chronological (append) order.
    fn messages(&self) -> &[Message];

    /// Messages can be updated in place (likes, status) but never added or
    /// removed through this slice.
    fn messages_mut(&mut self) -> &mut [Message];

    /// Append without checking the sender. Use [`MessageLog::add_message`].
    fn push_unchecked(&mut self, message: Message);

    /// Append a message authored by a participant.
    fn add_message(&mut self, message: Message) -> Result<()> {
        if !self.is_participant(message.sender_id()) {
            return Err(StoreError::SenderNotParticipant {
                sender: message.sender_id().to_string(),
                container: self.log_id().to_string(),
            });
        }
        self.push_unchecked(message);
        Ok(())
    }

    /// The last `limit` messages in chronological order, or the whole log
    /// when `limit` is `None` or exceeds the message count.
    fn recent(&self, limit: Option<usize>) -> &[Message] {
        let messages = self.messages();
        match limit {
            Some(n) if n <= messages.len() => &messages[messages.len() - n..],
            _ => messages,
        }
    }

    fn find_message(&self, message_id: &str) -> Option<&Message> {
        self.messages().iter().find(|m| m.id() == message_id)
    }

    fn find_message_mut(&mut self, message_id: &str) -> Option<&mut Message> {
        self.messages_mut().iter_mut().find(|m| m.id() == message_id)
    }

    fn message_count(&self) -> usize {
        self.messages().len()
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Entity counts across the whole store.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Statistics {
    pub users: usize,
    pub conversations: usize,
    pub groups: usize,
    pub messages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_defaults() {
        let msg = Message::new("m1", "u1", "hello");
        assert_eq!(msg.status(), MessageStatus::Sent);
        assert_eq!(msg.like_count(), 0);
        assert_eq!(msg.created_at().timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn test_like_is_idempotent() {
        let mut msg = Message::new("m1", "u1", "hello");
        assert!(msg.like("u2"));
        assert!(!msg.like("u2"));
        assert_eq!(msg.like_count(), 1);
        assert!(msg.is_liked_by("u2"));
    }

    #[test]
    fn test_unlike_before_like() {
        let mut msg = Message::new("m1", "u1", "hello");
        assert!(!msg.unlike("u2"));
        assert_eq!(msg.like_count(), 0);

        msg.like("u2");
        msg.like("u3");
        assert!(msg.unlike("u2"));
        assert_eq!(msg.liked_by(), ["u3".to_string()]);
    }

    #[test]
    fn test_from_parts_drops_duplicate_likes() {
        let msg = Message::from_parts(
            "m1".into(),
            "u1".into(),
            "hi".into(),
            Utc::now().trunc_subsecs(0),
            MessageStatus::Read,
            vec!["u2".into(), "u3".into(), "u2".into()],
        );
        assert_eq!(msg.liked_by(), ["u2".to_string(), "u3".to_string()]);
        assert_eq!(msg.status(), MessageStatus::Read);
    }

    #[test]
    fn test_models_serialize_for_ui() {
        let mut msg = Message::new("m1", "u1", "hello");
        msg.like("u2");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["status"], "sent");
        assert_eq!(value["liked_by"][0], "u2");

        let stats = Statistics { users: 2, messages: 1, ..Default::default() };
        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(value["users"], 2);
        assert_eq!(value["groups"], 0);
    }
}
