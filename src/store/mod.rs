//! Address store boundary.
//!
//! Stores accept whole batches or single documents; a document is never
//! partially visible. Uniqueness is keyed on the full address string.

mod memory;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::StoreError;
use crate::models::AddressDocument;
use crate::sink::{ErrorKind, ErrorReporter};

pub use memory::MemoryStore;

/// How the full-address index ended up being created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// Unique constraint on the full address
    Unique,
    /// Unique index could not be created; plain (or dynamic) index instead
    NonUnique,
}

#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Best-effort creation of the full-address index.
    async fn ensure_index(&self, reporter: &ErrorReporter) -> IndexMode;

    /// Unordered bulk insert. Returns the number of documents written.
    async fn insert_many(&self, docs: &[AddressDocument]) -> Result<usize, StoreError>;

    async fn insert_one(&self, doc: &AddressDocument) -> Result<(), StoreError>;
}

/// Outcome of saving one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveTally {
    pub saved: usize,
    pub duplicates: usize,
    pub errors: usize,
}

/// Save `docs`, falling back to one-at-a-time inserts when the bulk insert
/// fails so that duplicates and hard errors are counted separately.
pub async fn save_documents<S: AddressStore + ?Sized>(
    store: &S,
    docs: &[AddressDocument],
    reporter: &ErrorReporter,
) -> SaveTally {
    if docs.is_empty() {
        return SaveTally::default();
    }

    let retry: Vec<&AddressDocument> = match store.insert_many(docs).await {
        Ok(saved) => {
            return SaveTally {
                saved,
                ..SaveTally::default()
            }
        }
        Err(StoreError::Bulk { inserted, rejected }) => {
            reporter.report(
                ErrorKind::BulkInsertFailed,
                format!(
                    "Bulk insert rejected {} of {} documents, retrying individually",
                    rejected.len(),
                    docs.len()
                ),
            );
            let mut tally = retry_individually(
                store,
                rejected.iter().filter_map(|&i| docs.get(i)),
                reporter,
            )
            .await;
            tally.saved += inserted;
            return tally;
        }
        Err(e) => {
            reporter.report(
                ErrorKind::BulkInsertFailed,
                format!("Bulk insert failed ({}), processing individually", e),
            );
            docs.iter().collect()
        }
    };

    retry_individually(store, retry.into_iter(), reporter).await
}

async fn retry_individually<'a, S, I>(store: &S, docs: I, reporter: &ErrorReporter) -> SaveTally
where
    S: AddressStore + ?Sized,
    I: Iterator<Item = &'a AddressDocument>,
{
    let mut tally = SaveTally::default();

    for doc in docs {
        match store.insert_one(doc).await {
            Ok(()) => tally.saved += 1,
            Err(e) if e.is_duplicate() => {
                tally.duplicates += 1;
                let preview: String = doc.fulladdress.chars().take(50).collect();
                reporter.report(
                    ErrorKind::DuplicateAddress,
                    format!("Duplicate: {}...", preview),
                );
            }
            Err(e) => {
                tally.errors += 1;
                reporter.report(
                    ErrorKind::SaveError,
                    format!("Error saving document: {}", e),
                );
            }
        }
    }

    debug!(
        "Individual inserts: {} saved, {} duplicates, {} errors",
        tally.saved, tally.duplicates, tally.errors
    );
    tally
}
