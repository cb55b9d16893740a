//! Persistence of the idea collection.
//!
//! The whole collection lives in one named slot of a key-value medium as a
//! single JSON array. Every save replaces the slot; there is no incremental
//! write and no envelope around the array.

mod file;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use file::FileStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

use std::collections::HashSet;

use crate::error::StorageError;
use crate::idea::Idea;

/// Slot holding the idea collection unless configured otherwise.
pub const DEFAULT_SLOT_KEY: &str = "braindrop_ideas";

/// The host's durable key-value medium.
pub trait KeyValueStorage: Send + Sync {
    /// Read a slot. `Ok(None)` when the slot has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a slot's value in one step.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a slot. Removing a missing slot succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Reads and writes the idea collection in a single slot.
pub struct IdeaRepository {
    backend: Box<dyn KeyValueStorage>,
    key: String,
}

impl IdeaRepository {
    pub fn new(backend: Box<dyn KeyValueStorage>) -> Self {
        Self::with_key(backend, DEFAULT_SLOT_KEY)
    }

    pub fn with_key(backend: Box<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored collection; empty when nothing was ever saved.
    pub fn load(&self) -> Result<Vec<Idea>, StorageError> {
        match self.backend.get(&self.key)? {
            Some(blob) => decode(&blob),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the stored collection.
    pub fn save(&self, ideas: &[Idea]) -> Result<(), StorageError> {
        let blob = encode(ideas)?;
        self.backend.set(&self.key, &blob)
    }

    /// Remove the stored collection entirely.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove(&self.key)
    }
}

pub(crate) fn encode(ideas: &[Idea]) -> Result<String, StorageError> {
    serde_json::to_string(ideas).map_err(|e| StorageError::Unavailable(format!("encode: {}", e)))
}

/// Parse a slot blob. Ids must be unique across the collection.
pub(crate) fn decode(blob: &str) -> Result<Vec<Idea>, StorageError> {
    let ideas: Vec<Idea> =
        serde_json::from_str(blob).map_err(|e| StorageError::Decode(e.to_string()))?;
    let mut seen = HashSet::with_capacity(ideas.len());
    for idea in &ideas {
        if !seen.insert(&idea.id) {
            return Err(StorageError::Decode(format!("duplicate idea id {}", idea.id)));
        }
    }
    Ok(ideas)
}
