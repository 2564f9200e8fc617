//! The central coordinator.
//!
//! [`Messenger`] owns the identity directory, every conversation and group
//! chat, the active session and the id counters. Each operation validates
//! the session, identities and membership *before* touching any state, then
//! mutates, then rewrites the affected table.
//!
//! A failed write is reported as [`StoreError::Io`] but does not undo the
//! in-memory change: memory stays authoritative and the next successful save
//! (or an explicit [`Messenger::flush`]) brings the files back in line.
//!
//! The messenger is single-threaded. Callers that share one across threads
//! wrap it in a single `Mutex`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info};

use palaver_shared::types::{ContainerKind, ConversationId, MessageStatus};

use crate::config::StoreConfig;
use crate::conversations::Conversation;
use crate::directory::IdentityDirectory;
use crate::error::{Result, StoreError};
use crate::groups::GroupChat;
use crate::ids::{self, IdGenerator};
use crate::models::{Identity, Message, MessageLog, Statistics};
use crate::session::Session;
use crate::storage::Storage;

pub struct Messenger {
    directory: IdentityDirectory,
    conversations: BTreeMap<String, Conversation>,
    groups: BTreeMap<String, GroupChat>,
    session: Session,
    ids: IdGenerator,
    storage: Storage,
}

impl Messenger {
    /// Load all three tables described by `config`. Missing files are empty
    /// tables.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let storage = Storage::from_config(config);

        let mut directory = IdentityDirectory::new();
        for user in storage.load_users()? {
            directory.restore(user.id, user.display_name);
        }
        let conversations = storage.load_conversations()?;
        let groups = storage.load_groups()?;

        let persisted_messages: usize = conversations
            .values()
            .map(MessageLog::message_count)
            .chain(groups.values().map(MessageLog::message_count))
            .sum();
        let ids = IdGenerator::resume(persisted_messages as u64, groups.len() as u64);

        info!(
            users = directory.len(),
            conversations = conversations.len(),
            groups = groups.len(),
            messages = persisted_messages,
            "messenger store opened"
        );

        Ok(Self {
            directory,
            conversations,
            groups,
            session: Session::new(),
            ids,
            storage,
        })
    }

    /// Open with default file names inside `data_dir`.
    pub fn open_in(data_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::open(&StoreConfig::in_dir(data_dir))
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    pub fn login(&mut self, user_id: &str) -> Result<()> {
        if !self.directory.exists(user_id) {
            return Err(StoreError::UnknownUser(user_id.to_string()));
        }
        self.session.login(user_id);
        info!(user_id, "logged in");
        Ok(())
    }

    /// End the session, returning who was logged in.
    pub fn logout(&mut self) -> Option<String> {
        let previous = self.session.logout();
        if let Some(user_id) = &previous {
            info!(user_id = %user_id, "logged out");
        }
        previous
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// Id of the active identity.
    pub fn current_user(&self) -> Option<&str> {
        self.session.active_id()
    }

    /// Display name of the active identity.
    pub fn current_user_name(&self) -> Option<&str> {
        self.session
            .active_id()
            .and_then(|id| self.directory.name_of(id).ok())
    }

    // ------------------------------------------------------------------
    // Identities
    // ------------------------------------------------------------------

    pub fn register(&mut self, user_id: &str, display_name: &str) -> Result<()> {
        self.directory.register(user_id, display_name)?;
        info!(user_id, display_name, "registered user");
        self.save_users()
    }

    pub fn user_exists(&self, user_id: &str) -> bool {
        self.directory.exists(user_id)
    }

    pub fn name_of(&self, user_id: &str) -> Result<&str> {
        self.directory.name_of(user_id)
    }

    /// Every identity, sorted by id.
    pub fn list_users(&self) -> Vec<Identity> {
        self.directory.list_all()
    }

    // ------------------------------------------------------------------
    // Direct messages
    // ------------------------------------------------------------------

    /// Send `content` from the active identity to `receiver_id`, creating
    /// their conversation on first contact.
    pub fn send_direct_message(&mut self, receiver_id: &str, content: &str) -> Result<Message> {
        let sender_id = self.session.require()?.to_string();
        if !self.directory.exists(receiver_id) {
            return Err(StoreError::UnknownReceiver(receiver_id.to_string()));
        }
        if receiver_id == sender_id {
            return Err(StoreError::SelfMessage);
        }

        let conv_id = ConversationId::between(&sender_id, receiver_id);
        if let Some(existing) = self.conversations.get(conv_id.as_str()) {
            if !existing.is_between(&sender_id, receiver_id) {
                return Err(StoreError::ConversationConflict(conv_id.0));
            }
        }
        let message = Message::new(self.ids.next_message_id(), sender_id.as_str(), content);

        let conv = self.conversations.entry(conv_id.0).or_insert_with(|| {
            info!(a = %sender_id, b = receiver_id, "starting conversation");
            Conversation::new(&sender_id, receiver_id)
        });
        conv.add_message(message.clone())?;

        debug!(
            message_id = message.id(),
            conversation_id = conv.log_id(),
            "direct message sent"
        );
        self.save_conversations()?;
        Ok(message)
    }

    /// The conversation between `a` and `b`, in either order.
    pub fn conversation(&self, a: &str, b: &str) -> Option<&Conversation> {
        self.conversations
            .get(ConversationId::between(a, b).as_str())
            .filter(|c| c.is_between(a, b))
    }

    /// Conversations of the active identity.
    pub fn my_conversations(&self) -> Result<Vec<&Conversation>> {
        let user_id = self.session.require()?;
        Ok(self.conversations_for(user_id))
    }

    /// Conversations `user_id` takes part in, ordered by id.
    pub fn conversations_for(&self, user_id: &str) -> Vec<&Conversation> {
        self.conversations
            .values()
            .filter(|c| c.is_participant(user_id))
            .collect()
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    /// Create a group administered by the active identity.
    ///
    /// Every listed participant must be registered; otherwise nothing is
    /// created. The creator and repeated ids are skipped.
    pub fn create_group<S: AsRef<str>>(&mut self, name: &str, participant_ids: &[S]) -> Result<GroupChat> {
        let admin_id = self.session.require()?.to_string();
        ids::validate_name("group name", name)?;
        if let Some(unknown) = participant_ids
            .iter()
            .map(|id| id.as_ref())
            .find(|id| !self.directory.exists(id))
        {
            return Err(StoreError::UnknownParticipant(unknown.to_string()));
        }

        let mut group = GroupChat::new(self.ids.next_group_id(), name, admin_id.as_str());
        for user_id in participant_ids.iter().map(|id| id.as_ref()) {
            if !group.is_participant(user_id) {
                group.add_participant(user_id, &admin_id)?;
            }
        }

        info!(
            group_id = group.id(),
            name,
            admin = %admin_id,
            members = group.participant_count(),
            "group created"
        );
        self.groups.insert(group.id().to_string(), group.clone());
        self.save_groups()?;
        Ok(group)
    }

    pub fn send_group_message(&mut self, group_id: &str, content: &str) -> Result<Message> {
        let sender_id = self.session.require()?.to_string();
        let group = self
            .groups
            .get_mut(group_id)
            .ok_or_else(|| StoreError::UnknownGroup(group_id.to_string()))?;
        if !group.is_participant(&sender_id) {
            return Err(StoreError::NotGroupMember(group_id.to_string()));
        }

        let message = Message::new(self.ids.next_message_id(), sender_id.as_str(), content);
        group.add_message(message.clone())?;

        debug!(message_id = message.id(), group_id, "group message sent");
        self.save_groups()?;
        Ok(message)
    }

    pub fn group(&self, group_id: &str) -> Option<&GroupChat> {
        self.groups.get(group_id)
    }

    /// Groups of the active identity.
    pub fn my_groups(&self) -> Result<Vec<&GroupChat>> {
        let user_id = self.session.require()?;
        Ok(self.groups_for(user_id))
    }

    /// Groups `user_id` belongs to, ordered by id.
    pub fn groups_for(&self, user_id: &str) -> Vec<&GroupChat> {
        self.groups
            .values()
            .filter(|g| g.is_participant(user_id))
            .collect()
    }

    /// Admin only: add a registered identity to a group.
    pub fn add_group_member(&mut self, group_id: &str, user_id: &str) -> Result<()> {
        let acting_id = self.session.require()?.to_string();
        let group = self
            .groups
            .get_mut(group_id)
            .ok_or_else(|| StoreError::UnknownGroup(group_id.to_string()))?;
        if !group.is_admin(&acting_id) {
            return Err(StoreError::NotAuthorized);
        }
        if !self.directory.exists(user_id) {
            return Err(StoreError::UnknownUser(user_id.to_string()));
        }
        group.add_participant(user_id, &acting_id)?;

        info!(group_id, user_id, "member added");
        self.save_groups()
    }

    /// Admin only: remove a member. The admin cannot be removed.
    pub fn remove_group_member(&mut self, group_id: &str, user_id: &str) -> Result<()> {
        let acting_id = self.session.require()?.to_string();
        let group = self
            .groups
            .get_mut(group_id)
            .ok_or_else(|| StoreError::UnknownGroup(group_id.to_string()))?;
        group.remove_participant(user_id, &acting_id)?;

        info!(group_id, user_id, "member removed");
        self.save_groups()
    }

    /// Admin only: rename a group.
    pub fn rename_group(&mut self, group_id: &str, name: &str) -> Result<()> {
        let acting_id = self.session.require()?.to_string();
        ids::validate_name("group name", name)?;
        let group = self
            .groups
            .get_mut(group_id)
            .ok_or_else(|| StoreError::UnknownGroup(group_id.to_string()))?;
        group.rename(name, &acting_id)?;

        info!(group_id, name, "group renamed");
        self.save_groups()
    }

    // ------------------------------------------------------------------
    // Likes and read state
    // ------------------------------------------------------------------

    /// Like a message as the active identity. Returns `false` if it was
    /// already liked.
    pub fn like(&mut self, message_id: &str, container_id: &str, kind: ContainerKind) -> Result<bool> {
        let user_id = self.session.require()?.to_string();
        let log = self.participant_log(container_id, kind, &user_id)?;
        let message = log
            .find_message_mut(message_id)
            .ok_or_else(|| StoreError::UnknownMessage(message_id.to_string()))?;
        let added = message.like(&user_id);

        debug!(message_id, container_id, added, "like");
        if added {
            self.save_container(kind)?;
        }
        Ok(added)
    }

    /// Withdraw a like. Returns `false` if there was none.
    pub fn unlike(&mut self, message_id: &str, container_id: &str, kind: ContainerKind) -> Result<bool> {
        let user_id = self.session.require()?.to_string();
        let log = self.participant_log(container_id, kind, &user_id)?;
        let message = log
            .find_message_mut(message_id)
            .ok_or_else(|| StoreError::UnknownMessage(message_id.to_string()))?;
        let removed = message.unlike(&user_id);

        debug!(message_id, container_id, removed, "unlike");
        if removed {
            self.save_container(kind)?;
        }
        Ok(removed)
    }

    /// Mark every message written by someone else as read. Returns how many
    /// messages changed.
    pub fn mark_read(&mut self, container_id: &str, kind: ContainerKind) -> Result<usize> {
        let user_id = self.session.require()?.to_string();
        let log = self.participant_log(container_id, kind, &user_id)?;

        let mut changed = 0;
        for message in log.messages_mut() {
            if message.sender_id() != user_id && message.status() != MessageStatus::Read {
                message.set_status(MessageStatus::Read);
                changed += 1;
            }
        }

        debug!(container_id, changed, "marked read");
        if changed > 0 {
            self.save_container(kind)?;
        }
        Ok(changed)
    }

    /// Resolve a container the active identity belongs to.
    fn participant_log(
        &mut self,
        container_id: &str,
        kind: ContainerKind,
        user_id: &str,
    ) -> Result<&mut dyn MessageLog> {
        let log: &mut dyn MessageLog = match kind {
            ContainerKind::Conversation => self
                .conversations
                .get_mut(container_id)
                .map(|c| c as &mut dyn MessageLog),
            ContainerKind::Group => self
                .groups
                .get_mut(container_id)
                .map(|g| g as &mut dyn MessageLog),
        }
        .ok_or_else(|| StoreError::UnknownContainer {
            kind,
            id: container_id.to_string(),
        })?;

        if !log.is_participant(user_id) {
            return Err(StoreError::NotAParticipant(container_id.to_string()));
        }
        Ok(log)
    }

    // ------------------------------------------------------------------
    // Statistics and persistence
    // ------------------------------------------------------------------

    pub fn statistics(&self) -> Statistics {
        let messages = self
            .conversations
            .values()
            .map(MessageLog::message_count)
            .chain(self.groups.values().map(MessageLog::message_count))
            .sum();
        Statistics {
            users: self.directory.len(),
            conversations: self.conversations.len(),
            groups: self.groups.len(),
            messages,
        }
    }

    /// Rewrite all three tables from memory.
    pub fn flush(&self) -> Result<()> {
        self.save_users()?;
        self.save_conversations()?;
        self.save_groups()
    }

    fn save_users(&self) -> Result<()> {
        self.storage.save_users(&self.directory.list_all())
    }

    fn save_conversations(&self) -> Result<()> {
        self.storage.save_conversations(self.conversations.values())
    }

    fn save_groups(&self) -> Result<()> {
        self.storage.save_groups(self.groups.values())
    }

    fn save_container(&self, kind: ContainerKind) -> Result<()> {
        match kind {
            ContainerKind::Conversation => self.save_conversations(),
            ContainerKind::Group => self.save_groups(),
        }
    }
}
