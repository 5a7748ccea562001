//! Auth session holder.
//!
//! A lightweight cache of the current user and bearer token, backed by the
//! `user` and `token` storage slots. The checkout workflow consults it to
//! pick the authenticated or guest order endpoint; it never talks to the
//! network itself - the [`AuthClient`](crate::api::AuthClient) does that.

use secrecy::{ExposeSecret, SecretString};

use crate::models::user::UserProfile;
use crate::storage::{LocalStore, StorageError, slots};

/// Cached authentication state.
#[derive(Debug, Default)]
pub struct Session {
    user: Option<UserProfile>,
    token: Option<SecretString>,
}

impl Session {
    /// Restore the session from the `user` and `token` storage slots.
    ///
    /// Restoring never fails: a corrupt or unreadable slot loads as
    /// logged-out and is logged.
    #[must_use]
    pub fn load(store: &LocalStore) -> Self {
        let user = match store.get::<UserProfile>(slots::USER) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable persisted user profile");
                None
            }
        };

        let token = match store.get::<String>(slots::TOKEN) {
            Ok(token) => token.map(SecretString::from),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable persisted token");
                None
            }
        };

        Self { user, token }
    }

    /// The cached user profile, if logged in.
    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// The cached bearer token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Whether a token is cached. Checkout is possible either way; this
    /// only decides which order endpoint is used.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Cache a user and token and persist both slots.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if either slot cannot be written; the
    /// in-memory session is updated regardless.
    pub fn establish(
        &mut self,
        user: UserProfile,
        token: SecretString,
        store: &LocalStore,
    ) -> Result<(), StorageError> {
        store.set(slots::USER, &user)?;
        store.set(slots::TOKEN, token.expose_secret())?;
        self.user = Some(user);
        self.token = Some(token);
        Ok(())
    }

    /// Replace the cached profile (e.g. after a `current_user` refresh)
    /// and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the slot cannot be written.
    pub fn update_user(
        &mut self,
        user: UserProfile,
        store: &LocalStore,
    ) -> Result<(), StorageError> {
        store.set(slots::USER, &user)?;
        self.user = Some(user);
        Ok(())
    }

    /// Drop the cached session and remove both slots.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a slot cannot be removed; the in-memory
    /// session is cleared regardless.
    pub fn clear(&mut self, store: &LocalStore) -> Result<(), StorageError> {
        self.user = None;
        self.token = None;
        store.remove(slots::USER)?;
        store.remove(slots::TOKEN)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use spice_pantry_core::UserId;

    use super::*;

    fn temp_store() -> LocalStore {
        let dir = std::env::temp_dir().join(format!("sp-session-{}", uuid::Uuid::new_v4()));
        LocalStore::open(dir).unwrap()
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new("66b1"),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
        }
    }

    #[test]
    fn test_fresh_session_is_logged_out() {
        let store = temp_store();
        let session = Session::load(&store);
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_establish_persists_user_and_token() {
        let store = temp_store();
        let mut session = Session::load(&store);
        session
            .establish(profile(), SecretString::from("tok-123"), &store)
            .unwrap();

        let reloaded = Session::load(&store);
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.user().unwrap().name, "Asha");
        assert_eq!(reloaded.token().unwrap().expose_secret(), "tok-123");
    }

    #[test]
    fn test_clear_removes_both_slots() {
        let store = temp_store();
        let mut session = Session::load(&store);
        session
            .establish(profile(), SecretString::from("tok-123"), &store)
            .unwrap();
        session.clear(&store).unwrap();

        assert!(!session.is_authenticated());
        let reloaded = Session::load(&store);
        assert!(!reloaded.is_authenticated());
        assert!(reloaded.user().is_none());
    }

    #[test]
    fn test_corrupt_user_slot_loads_as_logged_out() {
        let store = temp_store();
        std::fs::write(store.root().join("user.json"), "{broken").unwrap();
        let session = Session::load(&store);
        assert!(session.user().is_none());
    }
}
