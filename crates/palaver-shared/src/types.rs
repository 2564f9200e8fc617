use serde::{Deserialize, Serialize};

use crate::constants::{CONVERSATION_ID_PREFIX, ID_SEPARATOR};

/// Canonical id of the conversation between two identities.
///
/// The pair is sorted before the id is built, so `between(a, b)` and
/// `between(b, a)` always address the same conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn between(a: &str, b: &str) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{CONVERSATION_ID_PREFIX}{lo}{ID_SEPARATOR}{hi}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delivery state of a message. The discriminants are the on-disk integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum MessageStatus {
    #[default]
    Sent = 0,
    Delivered = 1,
    Read = 2,
}

impl MessageStatus {
    pub fn as_int(self) -> u8 {
        self as u8
    }

    pub fn from_int(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::Sent),
            1 => Some(Self::Delivered),
            2 => Some(Self::Read),
            _ => None,
        }
    }
}

/// Which kind of container an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Conversation,
    Group,
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conversation => f.write_str("conversation"),
            Self::Group => f.write_str("group"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_id_is_order_independent() {
        let pairs = [("u1", "u2"), ("bob", "alice"), ("same", "same"), ("a", "ab")];
        for (a, b) in pairs {
            assert_eq!(ConversationId::between(a, b), ConversationId::between(b, a));
        }
    }

    #[test]
    fn test_conversation_id_format() {
        let id = ConversationId::between("u2", "u1");
        assert_eq!(id.as_str(), "conv_u1_u2");
        assert_eq!(id.to_string(), "conv_u1_u2");
    }

    #[test]
    fn test_status_integer_mapping() {
        assert_eq!(MessageStatus::Sent.as_int(), 0);
        assert_eq!(MessageStatus::Delivered.as_int(), 1);
        assert_eq!(MessageStatus::Read.as_int(), 2);
        assert_eq!(MessageStatus::from_int(2), Some(MessageStatus::Read));
        assert_eq!(MessageStatus::from_int(3), None);
    }
}
