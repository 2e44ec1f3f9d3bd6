//! Planner error taxonomy.
//!
//! Every failure propagates as a typed value; nothing is masked.  Warnings
//! (for example a request whose straight-line distance exceeds the battery
//! range) are logged and never alter control flow.

use thiserror::Error;

use ev_graph::GraphError;
use ev_search::{InfeasibleReport, SearchError};

/// Errors surfaced by [`RoutePlanner`](crate::RoutePlanner).
#[derive(Debug, Error)]
pub enum PlanError {
    /// Battery parameters outside their domain.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Planner configuration rejected at construction.
    #[error("configuration error: {0}")]
    Config(String),

    /// Geocoding failed, snapping failed, or the endpoints are not
    /// connected under the strict component policy.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The search finished with nothing accepted and no usable
    /// infeasibility report, so a two-segment plan cannot be attempted.
    /// The reports (possibly empty) are attached for explanation.
    #[error("no feasible route")]
    NoFeasibleRoute { infeasible: Vec<InfeasibleReport> },

    /// The two-segment planner ran but one leg yielded no feasible path.
    #[error("two-segment planning failed: leg {leg} has no feasible path")]
    TwoSegmentUnreachable { leg: u8 },

    /// Road graph, station index, or charging-station catalog not loaded.
    #[error("required data not available: {0}")]
    DataUnavailable(String),

    #[error("planning cancelled")]
    Cancelled,

    #[error("planning deadline exceeded")]
    DeadlineExceeded,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl From<SearchError> for PlanError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Cancelled => PlanError::Cancelled,
            SearchError::DeadlineExceeded => PlanError::DeadlineExceeded,
        }
    }
}

impl From<ev_core::CoreError> for PlanError {
    fn from(err: ev_core::CoreError) -> Self {
        match err {
            ev_core::CoreError::Config(msg) => PlanError::Config(msg),
            ev_core::CoreError::Battery(msg) => PlanError::InvalidRequest(msg),
        }
    }
}
