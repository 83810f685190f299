//! In-process address store used for dry runs and tests.

use async_trait::async_trait;
use hashbrown::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{AddressStore, IndexMode};
use crate::error::StoreError;
use crate::models::AddressDocument;
use crate::sink::ErrorReporter;

#[derive(Default)]
struct Inner {
    docs: Vec<AddressDocument>,
    keys: HashSet<String>,
    /// Full addresses that fail with a hard (non-duplicate) error
    poisoned: HashSet<String>,
}

/// Unique-by-full-address store held in memory
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_next_bulk: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make the next `insert_many` fail as a whole without writing anything
    pub fn fail_next_bulk(&self) {
        self.fail_next_bulk.store(true, Ordering::SeqCst);
    }

    /// Make every insert of `fulladdress` fail with a backend error
    pub fn reject_address(&self, fulladdress: &str) {
        self.lock().poisoned.insert(fulladdress.to_string());
    }

    /// Snapshot of every stored document, in insertion order
    pub fn documents(&self) -> Vec<AddressDocument> {
        self.lock().docs.clone()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.lock().docs.len()
    }

    /// Check if nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Inner {
    fn insert(&mut self, doc: &AddressDocument) -> Result<(), StoreError> {
        if self.poisoned.contains(&doc.fulladdress) {
            return Err(StoreError::Backend(format!(
                "write rejected for {}",
                doc.doc_id()
            )));
        }
        if !self.keys.insert(doc.fulladdress.clone()) {
            return Err(StoreError::Duplicate(doc.fulladdress.clone()));
        }
        self.docs.push(doc.clone());
        Ok(())
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn ensure_index(&self, _reporter: &ErrorReporter) -> IndexMode {
        IndexMode::Unique
    }

    async fn insert_many(&self, docs: &[AddressDocument]) -> Result<usize, StoreError> {
        if self.fail_next_bulk.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("bulk write unavailable".to_string()));
        }

        let mut inner = self.lock();
        let mut inserted = 0;
        let mut rejected = Vec::new();

        for (i, doc) in docs.iter().enumerate() {
            match inner.insert(doc) {
                Ok(()) => inserted += 1,
                Err(_) => rejected.push(i),
            }
        }

        if rejected.is_empty() {
            Ok(inserted)
        } else {
            Err(StoreError::Bulk { inserted, rejected })
        }
    }

    async fn insert_one(&self, doc: &AddressDocument) -> Result<(), StoreError> {
        self.lock().insert(doc)
    }
}
