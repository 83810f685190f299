//! Error types shared by the generator and validator pipelines.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to read one of the static reference files.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure talking to the geocoding API. Never fatal to a run.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("geocoding API access forbidden (403) for query: '{query}'")]
    Forbidden { query: String },

    #[error("geocoding API returned status {status} for query: '{query}'")]
    Status { status: u16, query: String },

    #[error("error querying geocoding API for query '{query}': {source}")]
    Network {
        query: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode geocoding response for query '{query}': {message}")]
    Decode { query: String, message: String },
}

/// Failure writing to the address store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The full address already exists in the store.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// A batch was only partly written. `rejected` holds the positions of the
    /// documents the store refused; everything else was persisted.
    #[error("bulk insert rejected {} of {} documents", rejected.len(), inserted + rejected.len())]
    Bulk { inserted: usize, rejected: Vec<usize> },

    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Check if this is a duplicate-key rejection
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate(_))
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("No cities found for country: {0}")]
    NoCities(String),
}
