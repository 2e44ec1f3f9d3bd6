//! `ev-search` — the bi-objective Pareto A★ core.
//!
//! A search minimizes two objectives at once: cumulative travel time, and
//! the maximum distance from any visited node to its nearest charging
//! station ("charging safety").  Instead of a single optimum it returns a
//! small Pareto set of routes trading the two off, plus a report for every
//! goal-reaching path that failed the battery feasibility check.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`search`]    | `find_pareto_paths`, `SearchContext`, `SearchOutcome`    |
//! | [`state`]     | frontier entry ordering                                  |
//! | [`dominance`] | per-node dominance table with entry cap                  |
//! | [`pareto`]    | accepted-route set (tolerance reject, strict strip)      |
//! | [`filter`]    | similarity filter over the final route list              |
//! | [`report`]    | `InfeasibleReport`                                       |
//! | [`limits`]    | `CancelToken`, `SearchLimits`                            |
//! | [`error`]     | `SearchError`                                            |
//!
//! One search runs on one thread and owns its frontier, dominance table and
//! result set; the graph, station index and catalog are shared read-only, so
//! any number of searches may run concurrently over the same data.

pub mod dominance;
pub mod error;
pub mod filter;
pub mod limits;
pub mod pareto;
pub mod report;
pub mod search;
pub mod state;

#[cfg(test)]
mod tests;

pub use dominance::DominanceTable;
pub use error::SearchError;
pub use filter::filter_similar_routes;
pub use limits::{CancelToken, SearchLimits};
pub use pareto::ParetoRoute;
pub use report::{InfeasibleReport, ReportedStation};
pub use search::{SearchContext, SearchOutcome, find_pareto_paths};
