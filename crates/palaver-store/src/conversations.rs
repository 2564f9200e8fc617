//! One-on-one conversations.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use palaver_shared::types::ConversationId;

use crate::models::{Message, MessageLog};

/// Message log between exactly two identities.
///
/// The participants are kept sorted, and the id is derived from that sorted
/// pair, so the conversation between A and B is the same object whichever of
/// them is asking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    id: ConversationId,
    participants: [String; 2],
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
}

impl Conversation {
    /// Start an empty conversation between `a` and `b`.
    pub fn new(a: &str, b: &str) -> Self {
        Self::with_created_at(a, b, Utc::now().trunc_subsecs(0))
    }

    pub(crate) fn with_created_at(a: &str, b: &str, created_at: DateTime<Utc>) -> Self {
        let mut participants = [a.to_string(), b.to_string()];
        participants.sort();
        Self {
            id: ConversationId::between(a, b),
            participants,
            messages: Vec::new(),
            created_at,
        }
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    /// The sorted participant pair.
    pub fn participants(&self) -> &[String; 2] {
        &self.participants
    }

    /// Whether this is the conversation of exactly `a` and `b`, in either order.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.participants[0] == lo && self.participants[1] == hi
    }

    /// The participant that is not `user_id`, if `user_id` takes part.
    pub fn other_participant(&self, user_id: &str) -> Option<&str> {
        let [first, second] = &self.participants;
        if first == user_id {
            Some(second.as_str())
        } else if second == user_id {
            Some(first.as_str())
        } else {
            None
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl MessageLog for Conversation {
    fn log_id(&self) -> &str {
        self.id.as_str()
    }

    fn is_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn messages_mut(&mut self) -> &mut [Message] {
        &mut self.messages
    }

    fn push_unchecked(&mut self, message: Message) {
        self.messages.push(message);
    }
}
