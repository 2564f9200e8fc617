//! Identifier generation and validation.

use chrono::Utc;

use palaver_shared::constants::{GROUP_ID_PREFIX, ID_SEPARATOR, MESSAGE_ID_PREFIX};

use crate::error::{Result, StoreError};

/// Counter-plus-timestamp id source owned by the messenger.
///
/// Ids are unique within a run. Across restarts they are only very likely
/// unique: a counter that resumes at the same value within the same second
/// would repeat an id.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    message_counter: u64,
    group_counter: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume counting after `messages` and `groups` already persisted records.
    pub fn resume(messages: u64, groups: u64) -> Self {
        Self {
            message_counter: messages,
            group_counter: groups,
        }
    }

    /// `msg_<counter>_<epoch seconds>`
    pub fn next_message_id(&mut self) -> String {
        self.message_counter += 1;
        format!(
            "{MESSAGE_ID_PREFIX}{}{ID_SEPARATOR}{}",
            self.message_counter,
            Utc::now().timestamp()
        )
    }

    /// `group_<counter>_<epoch seconds>`
    pub fn next_group_id(&mut self) -> String {
        self.group_counter += 1;
        format!(
            "{GROUP_ID_PREFIX}{}{ID_SEPARATOR}{}",
            self.group_counter,
            Utc::now().timestamp()
        )
    }
}

/// Ids must be non-empty and free of whitespace.
pub fn validate_id(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(StoreError::InvalidField {
            field,
            reason: "must not be empty",
        });
    }
    if value.chars().any(char::is_whitespace) {
        return Err(StoreError::InvalidField {
            field,
            reason: "must not contain whitespace",
        });
    }
    Ok(())
}

/// Names must contain something other than whitespace.
pub fn validate_name(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidField {
            field,
            reason: "must not be blank",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_ids_are_unique_and_prefixed() {
        let mut ids = IdGenerator::new();
        let first = ids.next_message_id();
        let second = ids.next_message_id();

        assert!(first.starts_with("msg_1_"));
        assert!(second.starts_with("msg_2_"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_counters_are_independent() {
        let mut ids = IdGenerator::new();
        ids.next_message_id();
        ids.next_message_id();
        assert!(ids.next_group_id().starts_with("group_1_"));
    }

    #[test]
    fn test_resume_continues_counting() {
        let mut ids = IdGenerator::resume(41, 6);
        assert!(ids.next_message_id().starts_with("msg_42_"));
        assert!(ids.next_group_id().starts_with("group_7_"));
    }

    #[test]
    fn test_validation() {
        assert!(validate_id("user id", "u1").is_ok());
        assert!(validate_id("user id", "").is_err());
        assert!(validate_id("user id", "a\tb").is_err());
        assert!(validate_name("group name", "Team A").is_ok());
        assert!(validate_name("group name", " \n").is_err());
    }
}
