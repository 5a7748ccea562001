//! User profile model.
//!
//! The narrow contract with the auth service: just enough to greet the
//! user and attribute orders. Persisted verbatim into the `user` storage
//! slot so the UI knows who is logged in before the first network call.

use serde::{Deserialize, Serialize};

use spice_pantry_core::UserId;

/// Profile of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User's id at the auth service.
    #[serde(alias = "_id")]
    pub id: UserId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Email address the account was registered with.
    pub email: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_mongo_id_alias() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"_id": "66b1", "name": "Asha", "email": "asha@example.com"}"#)
                .unwrap();
        assert_eq!(profile.id.as_str(), "66b1");
    }

    #[test]
    fn test_missing_name_defaults_to_empty() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"id": "66b1", "email": "asha@example.com"}"#).unwrap();
        assert_eq!(profile.name, "");
    }
}
