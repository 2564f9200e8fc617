//! File access for the three tables.
//!
//! Every save rewrites one whole table. A missing file loads as an empty
//! table; the data directory is created on first write.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::codec::{self, RowError};
use crate::config::StoreConfig;
use crate::conversations::Conversation;
use crate::error::{Result, StoreError};
use crate::groups::GroupChat;
use crate::models::Identity;

/// Paths of the identity, conversation and group tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    users: PathBuf,
    conversations: PathBuf,
    groups: PathBuf,
}

impl Storage {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            users: config.users_path(),
            conversations: config.conversations_path(),
            groups: config.groups_path(),
        }
    }

    pub fn users_path(&self) -> &Path {
        &self.users
    }

    pub fn conversations_path(&self) -> &Path {
        &self.conversations
    }

    pub fn groups_path(&self) -> &Path {
        &self.groups
    }

    // ------------------------------------------------------------------
    // Load
    // ------------------------------------------------------------------

    pub fn load_users(&self) -> Result<Vec<Identity>> {
        let users = match read_table(&self.users)? {
            Some(text) => codec::decode_users(&text).map_err(|e| corrupt(&self.users, e))?,
            None => Vec::new(),
        };
        tracing::info!(path = %self.users.display(), count = users.len(), "loaded users");
        Ok(users)
    }

    pub fn load_conversations(&self) -> Result<BTreeMap<String, Conversation>> {
        let conversations = match read_table(&self.conversations)? {
            Some(text) => {
                codec::decode_conversations(&text).map_err(|e| corrupt(&self.conversations, e))?
            }
            None => BTreeMap::new(),
        };
        tracing::info!(
            path = %self.conversations.display(),
            count = conversations.len(),
            "loaded conversations"
        );
        Ok(conversations)
    }

    pub fn load_groups(&self) -> Result<BTreeMap<String, GroupChat>> {
        let groups = match read_table(&self.groups)? {
            Some(text) => codec::decode_groups(&text).map_err(|e| corrupt(&self.groups, e))?,
            None => BTreeMap::new(),
        };
        tracing::info!(path = %self.groups.display(), count = groups.len(), "loaded groups");
        Ok(groups)
    }

    // ------------------------------------------------------------------
    // Save
    // ------------------------------------------------------------------

    pub fn save_users<'a>(&self, users: impl IntoIterator<Item = &'a Identity>) -> Result<()> {
        write_table(&self.users, &codec::encode_users(users))
    }

    pub fn save_conversations<'a>(
        &self,
        conversations: impl IntoIterator<Item = &'a Conversation>,
    ) -> Result<()> {
        write_table(&self.conversations, &codec::encode_conversations(conversations))
    }

    pub fn save_groups<'a>(&self, groups: impl IntoIterator<Item = &'a GroupChat>) -> Result<()> {
        write_table(&self.groups, &codec::encode_groups(groups))
    }
}

/// Read a whole table, or `None` if the file does not exist yet.
fn read_table(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "table missing, starting empty");
            Ok(None)
        }
        Err(e) => Err(StoreError::Io(e)),
    }
}

fn write_table(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to write table");
        StoreError::Io(e)
    })
}

fn corrupt(path: &Path, err: RowError) -> StoreError {
    StoreError::Corrupt {
        file: path.to_path_buf(),
        line: err.line,
        source: err.source,
    }
}
