//! Group chats with a single admin.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::models::{Message, MessageLog};

/// Message log shared by an administered set of identities.
///
/// The admin is the founder, is always a participant and can never be
/// removed. Participants keep the order in which they joined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupChat {
    id: String,
    name: String,
    admin_id: String,
    participants: Vec<String>,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
}

impl GroupChat {
    /// Found a group: `founder_id` becomes admin and sole participant.
    pub fn new(id: impl Into<String>, name: impl Into<String>, founder_id: impl Into<String>) -> Self {
        Self::with_created_at(id, name, founder_id, Utc::now().trunc_subsecs(0))
    }

    pub(crate) fn with_created_at(
        id: impl Into<String>,
        name: impl Into<String>,
        founder_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let admin_id = founder_id.into();
        Self {
            id: id.into(),
            name: name.into(),
            participants: vec![admin_id.clone()],
            admin_id,
            messages: Vec::new(),
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn admin_id(&self) -> &str {
        &self.admin_id
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_id == user_id
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Add `user_id` on behalf of `acting_id`, who must be the admin.
    pub fn add_participant(&mut self, user_id: &str, acting_id: &str) -> Result<()> {
        if !self.is_admin(acting_id) {
            return Err(StoreError::NotAuthorized);
        }
        if self.is_participant(user_id) {
            return Err(StoreError::AlreadyMember(user_id.to_string()));
        }
        self.participants.push(user_id.to_string());
        Ok(())
    }

    /// Remove `user_id` on behalf of `acting_id`, who must be the admin.
    /// The admin itself cannot be removed.
    pub fn remove_participant(&mut self, user_id: &str, acting_id: &str) -> Result<()> {
        if !self.is_admin(acting_id) {
            return Err(StoreError::NotAuthorized);
        }
        if self.is_admin(user_id) {
            return Err(StoreError::CannotRemoveAdmin);
        }
        let index = self
            .participants
            .iter()
            .position(|p| p == user_id)
            .ok_or_else(|| StoreError::NotMember(user_id.to_string()))?;
        self.participants.remove(index);
        Ok(())
    }

    /// Re-add a persisted member without an admin check. Duplicates are ignored.
    pub(crate) fn restore_participant(&mut self, user_id: String) {
        if !self.is_participant(&user_id) {
            self.participants.push(user_id);
        }
    }

    /// Rename the group on behalf of `acting_id`, who must be the admin.
    pub fn rename(&mut self, name: impl Into<String>, acting_id: &str) -> Result<()> {
        if !self.is_admin(acting_id) {
            return Err(StoreError::NotAuthorized);
        }
        self.name = name.into();
        Ok(())
    }
}

impl MessageLog for GroupChat {
    fn log_id(&self) -> &str {
        &self.id
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
