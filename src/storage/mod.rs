//! Persistent key-value storage for local data: session statistics, learned
//! loss patterns, cosmetic selections and the guest identity.

mod file;
mod memory;
mod profile;

pub use file::{FileStore, StorageConfig};
pub use memory::MemoryStore;
pub use profile::{load_or_create_guest_id, ThemeSelection, DEFAULT_THEME_ID};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

pub const STATS_KEY: &str = "connect4_stats";
pub const LEARNING_KEY: &str = "connect4_ai_learning";
pub const GUEST_ID_KEY: &str = "connect4_guest_id";
pub const THEMES_KEY: &str = "connect4_themes";

/// String-keyed persistent storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and deserialize a JSON value, `None` when the key is absent.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string_pretty(value)?;
    store.set(key, &raw)
}
