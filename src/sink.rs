//! Best-effort background error sink.
//!
//! Producers throughout generation report `(kind, message)` events without
//! ever blocking. A spawned task drains the queue in FIFO order, logs each
//! event and keeps a tally per kind. Delivery is not guaranteed: events still
//! queued when the process terminates are lost.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const RECV_WAIT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    IndexCreation,
    IndexCreationFallback,
    FileNotFound,
    ReferenceData,
    CountryNotFound,
    ApiForbidden,
    ApiError,
    ApiException,
    MissingFields,
    MissingOsm,
    BulkInsertFailed,
    DuplicateAddress,
    SaveError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::IndexCreation => "index_creation",
            ErrorKind::IndexCreationFallback => "index_creation_fallback",
            ErrorKind::FileNotFound => "file_not_found",
            ErrorKind::ReferenceData => "reference_data",
            ErrorKind::CountryNotFound => "country_not_found",
            ErrorKind::ApiForbidden => "api_forbidden",
            ErrorKind::ApiError => "api_error",
            ErrorKind::ApiException => "api_exception",
            ErrorKind::MissingFields => "missing_fields",
            ErrorKind::MissingOsm => "missing_osm",
            ErrorKind::BulkInsertFailed => "bulk_insert_failed",
            ErrorKind::DuplicateAddress => "duplicate_address",
            ErrorKind::SaveError => "save_error",
        }
    }

    /// Expected, high-volume rejections that are only interesting when debugging
    fn is_routine(&self) -> bool {
        matches!(
            self,
            ErrorKind::MissingFields | ErrorKind::MissingOsm | ErrorKind::DuplicateAddress
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub kind: ErrorKind,
    pub message: String,
}

/// Cheap, cloneable handle for reporting events
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    tx: UnboundedSender<ErrorEvent>,
}

impl ErrorReporter {
    /// Queue an event. Never blocks; a closed sink drops the event.
    pub fn report(&self, kind: ErrorKind, message: impl Into<String>) {
        let _ = self.tx.send(ErrorEvent {
            kind,
            message: message.into(),
        });
    }

    /// A reporter whose events go nowhere
    pub fn disconnected() -> Self {
        let (tx, _) = mpsc::unbounded_channel();
        Self { tx }
    }
}

/// Per-kind event counts collected by the drain task
pub type ErrorTally = BTreeMap<ErrorKind, usize>;

pub struct ErrorSink {
    handle: JoinHandle<ErrorTally>,
}

impl ErrorSink {
    /// Spawn the drain task on the current tokio runtime.
    pub fn spawn() -> (ErrorReporter, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(drain(rx));
        (ErrorReporter { tx }, Self { handle })
    }

    /// Wait for the drain task to finish (all reporters dropped) and return
    /// the tallies. Returns whatever was counted if `limit` elapses first.
    pub async fn finish(self, limit: Duration) -> ErrorTally {
        match tokio::time::timeout(limit, self.handle).await {
            Ok(Ok(tally)) => tally,
            Ok(Err(e)) => {
                warn!("Error sink task failed: {}", e);
                ErrorTally::new()
            }
            Err(_) => {
                warn!("Error sink did not drain within {:?}", limit);
                ErrorTally::new()
            }
        }
    }
}

async fn drain(mut rx: UnboundedReceiver<ErrorEvent>) -> ErrorTally {
    let mut tally = ErrorTally::new();

    loop {
        match tokio::time::timeout(RECV_WAIT, rx.recv()).await {
            Ok(Some(event)) => {
                if event.kind.is_routine() {
                    debug!(kind = %event.kind, "{}", event.message);
                } else {
                    warn!(kind = %event.kind, "{}", event.message);
                }
                *tally.entry(event.kind).or_insert(0) += 1;
            }
            // All reporters dropped
            Ok(None) => break,
            // Nothing queued; keep waiting
            Err(_) => continue,
        }
    }

    tally
}
