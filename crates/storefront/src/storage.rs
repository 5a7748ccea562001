//! Local slot storage.
//!
//! The storefront persists small pieces of state (the cart, the current
//! user profile, the bearer token) into named JSON slots under a data
//! directory, one file per slot. Slots are a derived cache of in-memory
//! state: they are rewritten after every mutation and validated on load,
//! so a corrupt or missing slot never takes the application down.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Well-known slot names.
pub mod slots {
    /// Serialized cart envelope (see [`crate::cart`]).
    pub const CART: &str = "cart";

    /// Serialized profile of the logged-in user.
    pub const USER: &str = "user";

    /// Bearer token string for the order/auth services.
    pub const TOKEN: &str = "token";
}

/// Errors that can occur reading or writing storage slots.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// Slot contents could not be serialized or deserialized.
    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A directory of named JSON slots.
///
/// Cheap to clone; holds only the root path. Writes are plain file writes:
/// a crash between an in-memory update and the slot write loses at most
/// that one write, which callers accept (the slot is a cache, not the
/// source of truth).
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The directory backing this store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read and deserialize a slot. Returns `Ok(None)` if the slot has
    /// never been written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] on filesystem failure and
    /// [`StorageError::Serde`] if the slot contents do not parse as `T`.
    pub fn get<T: DeserializeOwned>(&self, slot: &str) -> Result<Option<T>, StorageError> {
        let path = self.slot_path(slot);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Serialize and write a slot, replacing any previous contents.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serde`] if the value cannot be serialized,
    /// [`StorageError::Io`] if the file cannot be written.
    pub fn set<T: Serialize + ?Sized>(&self, slot: &str, value: &T) -> Result<(), StorageError> {
        let contents = serde_json::to_string(value)?;
        fs::write(self.slot_path(slot), contents)?;
        Ok(())
    }

    /// Delete a slot. Deleting a slot that does not exist is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] on filesystem failure other than the
    /// slot being absent.
    pub fn remove(&self, slot: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.root.join(format!("{slot}.json"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> LocalStore {
        let dir = std::env::temp_dir().join(format!("sp-storage-{}", uuid::Uuid::new_v4()));
        LocalStore::open(dir).unwrap()
    }

    #[test]
    fn test_get_missing_slot_is_none() {
        let store = temp_store();
        let value: Option<Vec<String>> = store.get("nothing").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let store = temp_store();
        store.set("numbers", &vec![1, 2, 3]).unwrap();
        let value: Option<Vec<i32>> = store.get("numbers").unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_set_replaces_previous_contents() {
        let store = temp_store();
        store.set("slot", "first").unwrap();
        store.set("slot", "second").unwrap();
        let value: Option<String> = store.get("slot").unwrap();
        assert_eq!(value.as_deref(), Some("second"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = temp_store();
        store.set("slot", &42).unwrap();
        store.remove("slot").unwrap();
        store.remove("slot").unwrap();
        let value: Option<i32> = store.get("slot").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_corrupt_slot_reports_serde_error() {
        let store = temp_store();
        std::fs::write(store.root().join("bad.json"), "not json {").unwrap();
        let result: Result<Option<i32>, _> = store.get("bad");
        assert!(matches!(result, Err(StorageError::Serde(_))));
    }
}
