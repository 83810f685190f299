//! Address document persisted to the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::xxh64;

/// Accepted, de-duplicated address.
///
/// Documents are never mutated after creation by this crate; `status` is
/// advanced by a separate downstream workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressDocument {
    /// Source provenance: "{osm_type} {osm_id}"
    pub osm: String,

    /// ISO country code as reported by the API ("Unknown" if absent)
    pub country: String,

    pub country_name: String,

    pub city: String,

    pub street_name: String,

    /// Workflow status, always 0 on creation
    pub status: i32,

    pub worker_id: i64,

    /// Comma-joined address; the uniqueness key
    pub fulladdress: String,

    pub created_at: DateTime<Utc>,
}

impl AddressDocument {
    /// Stable store identifier derived from the full address, so that the
    /// same address always maps to the same key.
    pub fn doc_id(&self) -> String {
        format!("{:016x}", xxh64(self.fulladdress.as_bytes(), 0))
    }
}
