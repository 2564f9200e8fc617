//! The identity directory: the only source of truth for "does this user
//! exist".

use std::collections::BTreeMap;

use palaver_shared::constants::ID_SEPARATOR;

use crate::error::{Result, StoreError};
use crate::ids;
use crate::models::Identity;

/// Registered identities keyed by id.
///
/// Iteration order is lexicographic by id.
#[derive(Debug, Clone, Default)]
pub struct IdentityDirectory {
    users: BTreeMap<String, String>,
}

impl IdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new identity. Fails if the id is taken.
    pub fn register(&mut self, id: &str, display_name: &str) -> Result<()> {
        ids::validate_id("user id", id)?;
        // Conversation ids join two user ids with the separator.
        if id.contains(ID_SEPARATOR) {
            return Err(StoreError::InvalidField {
                field: "user id",
                reason: "must not contain '_'",
            });
        }
        ids::validate_name("display name", display_name)?;

        if self.users.contains_key(id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        self.users.insert(id.to_string(), display_name.to_string());
        Ok(())
    }

    pub fn exists(&self, id: &str) -> bool {
        self.users.contains_key(id)
    }

    pub fn name_of(&self, id: &str) -> Result<&str> {
        self.users
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| StoreError::UnknownUser(id.to_string()))
    }

    /// All identities, sorted by id.
    pub fn list_all(&self) -> Vec<Identity> {
        self.users
            .iter()
            .map(|(id, name)| Identity {
                id: id.clone(),
                display_name: name.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Insert a persisted row as is. The codec rejects repeated ids.
    pub(crate) fn restore(&mut self, id: String, display_name: String) {
        self.users.insert(id, display_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut dir = IdentityDirectory::new();
        dir.register("u1", "Alice").unwrap();

        assert!(dir.exists("u1"));
        assert!(!dir.exists("u2"));
        assert_eq!(dir.name_of("u1").unwrap(), "Alice");
        assert!(matches!(dir.name_of("u2"), Err(StoreError::UnknownUser(_))));
    }

    #[test]
    fn test_register_duplicate_fails() {
        let mut dir = IdentityDirectory::new();
        dir.register("u1", "Alice").unwrap();
        let err = dir.register("u1", "Mallory").unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert_eq!(dir.name_of("u1").unwrap(), "Alice");
    }

    #[test]
    fn test_list_all_is_sorted_by_id() {
        let mut dir = IdentityDirectory::new();
        dir.register("u3", "Carol").unwrap();
        dir.register("u1", "Alice").unwrap();
        dir.register("u2", "Bob").unwrap();

        let ids: Vec<String> = dir.list_all().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn test_register_rejects_blank_values() {
        let mut dir = IdentityDirectory::new();
        assert!(matches!(dir.register("", "Nobody"), Err(StoreError::InvalidField { .. })));
        assert!(matches!(dir.register("u 1", "Space"), Err(StoreError::InvalidField { .. })));
        assert!(matches!(dir.register("u1", "  "), Err(StoreError::InvalidField { .. })));
        assert!(dir.is_empty());
    }

    #[test]
    fn test_register_rejects_id_separator() {
        let mut dir = IdentityDirectory::new();
        assert!(matches!(
            dir.register("a_b", "Ambiguous"),
            Err(StoreError::InvalidField { field: "user id", .. })
        ));
        assert!(!dir.exists("a_b"));
    }
}
