// Errors surfaced by query operations
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by [`HistorianQuery`](crate::HistorianQuery) operations.
///
/// Configuration problems are caught eagerly when the
/// [`QuerySpec`](crate::QuerySpec) is built, range problems per call.
/// Store failures pass through unchanged; the engine is pure and never
/// retries, so a failed call can simply be reissued by the caller.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid query range: start {start} must be before end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("reading store holds no readings")]
    EmptyStore,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
