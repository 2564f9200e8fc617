//! The single active session of a running instance.

use crate::error::{Result, StoreError};

/// `LoggedOut --login--> LoggedIn(id) --logout--> LoggedOut`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    active_id: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `user_id` the active identity, replacing any previous one.
    /// Whether the id is registered is the caller's business.
    pub fn login(&mut self, user_id: &str) {
        self.active_id = Some(user_id.to_string());
    }

    /// End the session, returning the identity that was active.
    pub fn logout(&mut self) -> Option<String> {
        self.active_id.take()
    }

    pub fn is_logged_in(&self) -> bool {
        self.active_id.is_some()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// The active identity, or `NotAuthenticated`.
    pub fn require(&self) -> Result<&str> {
        self.active_id().ok_or(StoreError::NotAuthenticated)
    }
}
