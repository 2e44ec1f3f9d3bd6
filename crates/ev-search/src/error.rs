//! Search-subsystem error type.

use thiserror::Error;

/// External lifecycle signals that abort a running search.
///
/// Both abort cleanly: the search's frontier, dominance table and partial
/// result set are dropped and nothing is published.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("search cancelled")]
    Cancelled,

    #[error("search deadline exceeded")]
    DeadlineExceeded,
}
