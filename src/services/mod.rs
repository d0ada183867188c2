pub(crate) mod aggregate;
pub(crate) mod attendance;
pub(crate) mod progress;
pub(crate) mod reports;

use thiserror::Error;

use crate::store::StoreError;

/// Failure taxonomy shared by the two ledgers and the report builder.
///
/// `Validation` and `NotFound` are rejected before any write. `Conflict`
/// covers state-machine violations and compare-and-write losers; callers may
/// retry only after re-reading current state. `Storage` surfaces persistence
/// failures untouched; retry policy belongs to the calling layer.
#[derive(Debug, Error)]
pub(crate) enum LedgerError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}
