//! `ev-planner` — query orchestration over the Pareto search.
//!
//! A [`RoutePlanner`] owns the loaded road graph, station index and station
//! catalog, and answers [`PlanRequest`]s: resolve the endpoint addresses,
//! snap them to graph nodes, run the direct Pareto search, and fall back to
//! a two-segment plan around an intermediate charging stop when no direct
//! route can preserve the SOC threshold.
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`planner`]     | `RoutePlanner` and the query pipeline                 |
//! | [`two_segment`] | charging-stop selection, leg composition              |
//! | [`geocode`]     | `Geocoder` trait seam, `StaticGeocoder`               |
//! | [`types`]       | `PlanRequest`, `PlanResponse`, `PlannedRoute`         |
//! | [`error`]       | `PlanError` (the full error taxonomy)                 |
//!
//! The planner is cheap to share: all owned data is read-only after load,
//! so one instance serves any number of concurrent `plan` calls.

pub mod error;
pub mod geocode;
pub mod planner;
pub mod two_segment;
pub mod types;


pub use error::PlanError;
pub use geocode::{Geocoder, StaticGeocoder};
pub use planner::RoutePlanner;
pub use types::{ChargingStop, Endpoint, PlanRequest, PlanResponse, PlannedRoute};

pub use ev_search::{CancelToken, InfeasibleReport, SearchLimits};
