//! The accepted Pareto route set.
//!
//! Acceptance is asymmetric on purpose: a candidate is *rejected* only when
//! an accepted route beats it on both objectives by the relative tolerance
//! ε, but once a candidate survives, it *strips* accepted routes it strictly
//! dominates.  The tolerance keeps near-duplicates of an accepted route out
//! without letting marginally-worse routes erase genuinely distinct ones.

use ev_core::NodeId;

/// One accepted route with its objective vector and arrival SOC.
#[derive(Clone, Debug)]
pub struct ParetoRoute {
    /// Node path, start first.  Loop-free; consecutive pairs are edges.
    pub path: Vec<NodeId>,
    /// First objective: cumulative travel time, seconds.
    pub time_s: f64,
    /// Second objective: maximum nearest-station distance over the nodes
    /// entered by the route, metres.
    pub max_station_dist_m: f64,
    /// SOC on arrival, percent.
    pub remaining_soc: f64,
}

/// Mutable accepted set maintained during one search.
pub(crate) struct ParetoSet {
    routes: Vec<ParetoRoute>,
    tolerance: f64,
}

impl ParetoSet {
    pub fn new(tolerance: f64) -> Self {
        Self { routes: Vec::new(), tolerance }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Accept `candidate` unless it is tolerance-dominated; on acceptance,
    /// strip accepted routes the candidate strictly dominates.  Returns
    /// whether the candidate was kept.
    pub fn try_accept(&mut self, candidate: ParetoRoute) -> bool {
        let tol = 1.0 + self.tolerance;
        let dominated = self.routes.iter().any(|r| {
            r.time_s * tol <= candidate.time_s && r.max_station_dist_m * tol <= candidate.max_station_dist_m
        });
        if dominated {
            return false;
        }

        self.routes.retain(|r| {
            let weakly = candidate.time_s <= r.time_s
                && candidate.max_station_dist_m <= r.max_station_dist_m;
            let strictly = candidate.time_s < r.time_s
                || candidate.max_station_dist_m < r.max_station_dist_m;
            !(weakly && strictly)
        });
        self.routes.push(candidate);
        true
    }

    /// Finish the search: order by travel time ascending and truncate to the
    /// pre-filter cap `k`.
    pub fn into_sorted_truncated(self, k: usize) -> Vec<ParetoRoute> {
        let mut routes = self.routes;
        routes.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));
        routes.truncate(k);
        routes
    }
}
