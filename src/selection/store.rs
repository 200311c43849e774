//! Persistence slot for the selection set
//!
//! A store holds exactly one string value under a fixed key. The value is
//! the serialized selection; the store does not interpret it.

use crate::error::{Result, RoutineError};
use sled::Db;
use std::path::Path;
use std::sync::Mutex;

/// Key under which the serialized selection is stored
pub const SELECTION_KEY: &str = "selectedProducts";

/// A single string-keyed persistence slot
pub trait SelectionStore: Send + Sync {
    /// Read the raw stored value, `None` if nothing has been saved
    fn load_raw(&self) -> Result<Option<String>>;

    /// Replace the stored value
    fn save_raw(&self, value: &str) -> Result<()>;

    /// Remove the stored value
    fn clear(&self) -> Result<()>;
}

/// Selection slot backed by an embedded `sled` database
///
/// # Examples
///
/// ```
/// use routine_builder::selection::{SelectionStore, SledSelectionStore};
///
/// # fn main() -> routine_builder::error::Result<()> {
/// let dir = tempfile::tempdir()?;
/// let store = SledSelectionStore::open(dir.path().join("selection.db"))?;
/// store.save_raw("[]")?;
/// assert_eq!(store.load_raw()?.as_deref(), Some("[]"));
/// # Ok(())
/// # }
/// ```
pub struct SledSelectionStore {
    db: Db,
}

impl SledSelectionStore {
    /// Open or create the selection database at `path`
    ///
    /// # Errors
    ///
    /// Returns `RoutineError::Storage` if the database cannot be opened
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RoutineError::Storage(format!("Failed to create storage directory: {}", e))
            })?;
        }

        let db = sled::open(path)
            .map_err(|e| RoutineError::Storage(format!("Failed to open database: {}", e)))?;
        tracing::debug!("Opened selection store at {}", path.display());
        Ok(Self { db })
    }
}

impl SelectionStore for SledSelectionStore {
    fn load_raw(&self) -> Result<Option<String>> {
        let value = self
            .db
            .get(SELECTION_KEY)
            .map_err(|e| RoutineError::Storage(format!("Failed to read selection: {}", e)))?;

        match value {
            Some(bytes) => {
                let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    RoutineError::Storage(format!("Stored selection is not UTF-8: {}", e))
                })?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    fn save_raw(&self, value: &str) -> Result<()> {
        self.db
            .insert(SELECTION_KEY, value.as_bytes())
            .map_err(|e| RoutineError::Storage(format!("Failed to save selection: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| RoutineError::Storage(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.db
            .remove(SELECTION_KEY)
            .map_err(|e| RoutineError::Storage(format!("Failed to clear selection: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| RoutineError::Storage(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

/// In-memory selection slot
#[derive(Debug, Default)]
pub struct MemorySelectionStore {
    slot: Mutex<Option<String>>,
}

impl MemorySelectionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a raw value
    pub fn with_raw(value: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(value.into())),
        }
    }
}

impl SelectionStore for MemorySelectionStore {
    fn load_raw(&self) -> Result<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| RoutineError::Storage("Selection slot lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save_raw(&self, value: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| RoutineError::Storage("Selection slot lock poisoned".to_string()))?;
        *slot = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| RoutineError::Storage("Selection slot lock poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_roundtrip_and_clear() {
        let store = MemorySelectionStore::new();
        assert!(store.load_raw().unwrap().is_none());

        store.save_raw("[1]").unwrap();
        assert_eq!(store.load_raw().unwrap().as_deref(), Some("[1]"));

        store.clear().unwrap();
        assert!(store.load_raw().unwrap().is_none());
    }

    #[test]
    fn test_sled_store_roundtrip_and_clear() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("selection.db");
        let store = SledSelectionStore::open(&path).unwrap();
        assert!(store.load_raw().unwrap().is_none());

        store.save_raw("[\"first\"]").unwrap();
        store.save_raw("[\"kept\"]").unwrap();
        assert_eq!(store.load_raw().unwrap().as_deref(), Some("[\"kept\"]"));

        store.clear().unwrap();
        assert!(store.load_raw().unwrap().is_none());
    }
}
