//! Core ledger processing and business logic
//!
//! The [`LedgerStore`] owns the ordered list of entries (newest first),
//! applies create/delete, and writes the full list to a storage slot after
//! every change. Filtering and aggregation are pure functions over a slice
//! of entries.

pub mod error;
pub mod filter;
pub mod models;
pub mod reports;
pub mod storage;
pub mod types;

use expenseweb_config::Config;
use std::collections::HashSet;
use std::sync::Arc;

pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity};
pub use filter::{filter, FilterCriteria};
pub use models::{Entry, EntryDraft, Rejection};
pub use reports::{aggregate, CreateResponse, DeleteResponse, EntriesResponse, Totals};
pub use storage::{FileStorage, MemoryStorage, SlotStorage, StorageRef};
pub use types::{Category, CategoryFilter, EntryType, TypeFilter};

/// Owns the ledger and its storage slot
pub struct LedgerStore {
    storage: StorageRef,
    key: String,
    entries: Vec<Entry>,
}

impl LedgerStore {
    /// Create an empty store; call [`LedgerStore::load`] to rehydrate
    pub fn new(storage: StorageRef, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            entries: Vec::new(),
        }
    }

    /// Create a store and load whatever the slot holds
    pub fn open(storage: StorageRef, key: impl Into<String>) -> Self {
        let mut store = Self::new(storage, key);
        store.load();
        store
    }

    /// Open the file-backed slot named by the configuration
    pub fn from_config(config: &Config) -> Self {
        let storage = Arc::new(FileStorage::new(&config.storage.path));
        Self::open(storage, config.storage.key.clone())
    }

    /// Slot key
    pub fn key(&self) -> &str {
        &self.key
    }

    // ==================== Lifecycle ====================

    /// Replace the in-memory ledger with the slot's snapshot.
    ///
    /// A missing, unreadable or malformed snapshot gives an empty ledger.
    /// Returns the number of entries loaded.
    pub fn load(&mut self) -> usize {
        let logger = DefaultErrorLogger;
        let context = ErrorContext::new("load").with_data("key", serde_json::json!(self.key));

        self.entries = match self.storage.get(&self.key) {
            Ok(Some(raw)) => parse_snapshot(&raw, &logger, &context),
            Ok(None) => {
                log::info!("No snapshot under '{}', starting with an empty ledger", self.key);
                Vec::new()
            }
            Err(e) => {
                logger.log_error(&e, &context);
                Vec::new()
            }
        };

        log::info!("Loaded {} entries from '{}'", self.entries.len(), self.key);
        self.entries.len()
    }

    /// Write the full ledger to the slot
    pub fn persist(&self) -> CoreResult<()> {
        let snapshot = serde_json::to_string(&self.entries)?;
        self.storage.set(&self.key, &snapshot)
    }

    // ==================== Mutations ====================

    /// Add the draft as a new entry at the front of the ledger.
    ///
    /// Invalid drafts are ignored and give `Ok(None)`. On success the draft's
    /// title and amount are cleared. A storage failure keeps the entry in
    /// memory and is returned as an error.
    pub fn create(&mut self, draft: &mut EntryDraft) -> CoreResult<Option<Entry>> {
        let entry = match draft.to_entry(self.fresh_id()) {
            Ok(entry) => entry,
            Err(rejection) => {
                log::debug!("Create ignored: {}", rejection);
                return Ok(None);
            }
        };

        self.entries.insert(0, entry.clone());
        draft.clear_transient();
        log::debug!("Created entry {} ({} {})", entry.id, entry.entry_type, entry.amount);

        self.persist()?;
        Ok(Some(entry))
    }

    /// Remove the entry with this id. Returns whether one was removed;
    /// an unknown id leaves memory and storage alone.
    pub fn delete(&mut self, id: &str) -> CoreResult<bool> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            log::debug!("Delete ignored, no entry {}", id);
            return Ok(false);
        }

        log::debug!("Deleted entry {}", id);
        self.persist()?;
        Ok(true)
    }

    // ==================== Queries ====================

    /// All entries, newest first
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries matching the criteria, in ledger order
    pub fn filtered(&self, criteria: &FilterCriteria) -> Vec<&Entry> {
        filter(&self.entries, criteria)
    }

    /// Totals over the entries matching the criteria
    pub fn totals(&self, criteria: &FilterCriteria) -> Totals {
        aggregate(self.filtered(criteria))
    }

    /// Filtered entries plus their totals
    pub fn query(&self, criteria: &FilterCriteria) -> EntriesResponse {
        let entries: Vec<Entry> = self.filtered(criteria).into_iter().cloned().collect();
        let totals = aggregate(&entries);
        EntriesResponse {
            total_count: entries.len(),
            entries,
            totals,
        }
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = expenseweb_utils::generate_id();
            if self.entry(&id).is_none() {
                return id;
            }
        }
    }
}

/// Decode a snapshot, dropping elements that do not decode, entries that
/// break the entry rules, and repeated ids (first occurrence wins)
fn parse_snapshot(raw: &str, logger: &dyn ErrorLogger, context: &ErrorContext) -> Vec<Entry> {
    let items: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(e) => {
            logger.log_warning(&format!("Snapshot is not a JSON array: {}", e), context);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let entry = match serde_json::from_value::<Entry>(item) {
            Ok(entry) => entry,
            Err(e) => {
                logger.log_warning(&format!("Skipping entry at index {}: {}", index, e), context);
                continue;
            }
        };
        if let Err(rejection) = entry.check() {
            logger.log_warning(
                &format!("Skipping entry {} at index {}: {}", entry.id, index, rejection),
                context,
            );
            continue;
        }
        if seen.insert(entry.id.clone()) {
            entries.push(entry);
        } else {
            logger.log_warning(&format!("Duplicate id {} at index {}", entry.id, index), context);
        }
    }
    entries
}

// ==================== Tests ====================
