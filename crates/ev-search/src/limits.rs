//! Cancellation and deadline plumbing.
//!
//! A planner owner hands the search a [`SearchLimits`]; the search calls
//! [`SearchLimits::check`] once per frontier pop and aborts with a typed
//! error when either signal fires.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::error::SearchError;

/// Cloneable cancellation handle shared between the requester and the search.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.  Takes effect at the search's next frontier pop.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// External lifecycle bounds of one search invocation.
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    pub cancel: Option<CancelToken>,
    pub deadline: Option<Instant>,
}

impl SearchLimits {
    /// No cancellation, no deadline.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_cancel(token: CancelToken) -> Self {
        Self { cancel: Some(token), ..Self::default() }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self { deadline: Some(deadline), ..Self::default() }
    }

    /// Fail if either signal has fired.
    pub fn check(&self) -> Result<(), SearchError> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(SearchError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(SearchError::DeadlineExceeded);
        }
        Ok(())
    }
}
