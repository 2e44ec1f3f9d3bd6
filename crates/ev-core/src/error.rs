//! Core error type.
//!
//! Sub-crates define their own error enums and either convert `CoreError`
//! via `From` impls or wrap it as one variant.

use thiserror::Error;

/// Errors produced by `ev-core` validation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid battery parameters: {0}")]
    Battery(String),
}

/// Shorthand result type for `ev-core` operations.
pub type CoreResult<T> = Result<T, CoreError>;
