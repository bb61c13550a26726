//! Key-value slot storage backing the ledger snapshot

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::error::{CoreError, CoreResult};

/// Storage reference type
pub type StorageRef = Arc<dyn SlotStorage>;

/// A store of named text values, each replaced as a whole on write
pub trait SlotStorage: Send + Sync {
    /// Read a slot; `None` when nothing was ever written
    fn get(&self, key: &str) -> CoreResult<Option<String>>;

    /// Replace a slot's value
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;
}

/// One JSON file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing a slot
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SlotStorage for FileStorage {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        match std::fs::read_to_string(self.slot_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        // Write beside the slot, then rename over it so readers never see half a file
        let path = self.slot_path(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;

        log::debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// In-process slot map
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with one slot already filled
    pub fn with_slot(key: &str, value: &str) -> Self {
        let mut slots = HashMap::new();
        slots.insert(key.to_string(), value.to_string());
        Self {
            slots: RwLock::new(slots),
        }
    }
}

fn poisoned() -> CoreError {
    CoreError::InternalError {
        message: "memory storage lock poisoned".to_string(),
    }
}

impl SlotStorage for MemoryStorage {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let slots = self.slots.read().map_err(|_| poisoned())?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut slots = self.slots.write().map_err(|_| poisoned())?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("expenseweb-storage-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("expense-items").unwrap(), None);

        storage.set("expense-items", "[]").unwrap();
        assert_eq!(storage.get("expense-items").unwrap().as_deref(), Some("[]"));

        storage.set("expense-items", "[1]").unwrap();
        assert_eq!(storage.get("expense-items").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_file_storage_missing_slot() {
        let storage = FileStorage::new(scratch_dir());
        assert_eq!(storage.get("expense-items").unwrap(), None);
    }

    #[test]
    fn test_file_storage_write_and_replace() {
        let dir = scratch_dir();
        let storage = FileStorage::new(&dir);

        storage.set("expense-items", "[]").unwrap();
        storage.set("expense-items", "[{\"a\":1}]").unwrap();

        assert_eq!(
            storage.get("expense-items").unwrap().as_deref(),
            Some("[{\"a\":1}]")
        );
        assert!(storage.slot_path("expense-items").exists());
        assert!(!dir.join(".expense-items.json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
