//! In-memory session state.

use crate::models::User;

/// In-memory record of the authenticated user and the startup loading
/// flag. This is the single source of truth the rest of the application
/// reads; only the session manager mutates it.
///
/// `is_loading` covers startup restoration only. Login, signup, and
/// logout have their own pending flags owned by whoever invokes them.
#[derive(Debug, Clone)]
pub struct SessionState {
    user: Option<User>,
    is_loading: bool,
}

impl SessionState {
    /// Fresh state: no user, loading until restoration settles.
    pub fn new() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Derived: a session exists iff a user snapshot is present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub(crate) fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    pub(crate) fn clear(&mut self) {
        self.user = None;
    }

    /// Marks startup restoration finished; the flag never goes true again.
    pub(crate) fn finish_loading(&mut self) {
        self.is_loading = false;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user() -> User {
        User {
            id: 1,
            username: "a@b.com".to_string(),
            email: "a@b.com".to_string(),
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn starts_empty_and_loading() {
        let state = SessionState::new();
        assert!(state.is_loading());
        assert!(!state.is_authenticated());
        assert!(state.user().is_none());
    }

    #[test]
    fn authentication_is_derived_from_user_presence() {
        let mut state = SessionState::new();
        state.set_user(user());
        assert!(state.is_authenticated());

        state.clear();
        assert!(!state.is_authenticated());
        assert!(state.user().is_none());
    }

    #[test]
    fn loading_flag_drops_once() {
        let mut state = SessionState::new();
        state.finish_loading();
        assert!(!state.is_loading());

        // Later mutations never resurrect the flag.
        state.set_user(user());
        state.clear();
        assert!(!state.is_loading());
    }
}
