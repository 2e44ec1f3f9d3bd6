//! Graph-subsystem error type.

use thiserror::Error;

/// Errors produced by `ev-graph` loading and construction.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dataset parse error: {0}")]
    Parse(String),

    #[error("edge references missing node: {source_id} -> {target_id}")]
    MissingEndpoint { source_id: i64, target_id: i64 },

    #[error("road graph has no nodes")]
    EmptyGraph,
}

pub type GraphResult<T> = Result<T, GraphError>;
