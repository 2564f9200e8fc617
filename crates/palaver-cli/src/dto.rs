//! JSON shapes printed by the command runner.

use serde::Serialize;

use palaver_store::{Conversation, GroupChat, Message, MessageLog, MessageStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub sender_id: String,
    pub content: String,
    pub timestamp: String,
    pub status: MessageStatus,
    pub liked_by: Vec<String>,
    pub like_count: usize,
}

impl From<&Message> for MessageDto {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id().to_string(),
            sender_id: m.sender_id().to_string(),
            content: m.content().to_string(),
            timestamp: m.created_at().to_rfc3339(),
            status: m.status(),
            liked_by: m.liked_by().to_vec(),
            like_count: m.like_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub id: String,
    pub participants: Vec<String>,
    pub created_at: String,
    pub total_messages: usize,
    pub messages: Vec<MessageDto>,
}

impl ConversationDto {
    /// Summary with the last `limit` messages (`None` shows all).
    pub fn with_recent(conv: &Conversation, limit: Option<usize>) -> Self {
        Self {
            id: conv.id().to_string(),
            participants: conv.participants().to_vec(),
            created_at: conv.created_at().to_rfc3339(),
            total_messages: conv.message_count(),
            messages: conv.recent(limit).iter().map(MessageDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDto {
    pub id: String,
    pub name: String,
    pub admin_id: String,
    pub participants: Vec<String>,
    pub created_at: String,
    pub total_messages: usize,
    pub messages: Vec<MessageDto>,
}

impl GroupDto {
    pub fn with_recent(group: &GroupChat, limit: Option<usize>) -> Self {
        Self {
            id: group.id().to_string(),
            name: group.name().to_string(),
            admin_id: group.admin_id().to_string(),
            participants: group.participants().to_vec(),
            created_at: group.created_at().to_rfc3339(),
            total_messages: group.message_count(),
            messages: group.recent(limit).iter().map(MessageDto::from).collect(),
        }
    }
}
