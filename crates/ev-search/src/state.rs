//! Frontier entry of the bi-objective search.

use ev_core::NodeId;

/// One explorable state: a loop-free path prefix ending at `node`, with its
/// accumulated objectives and priority.
///
/// Ordering is on `f_score` alone, ties broken by insertion sequence so the
/// expansion order is deterministic (the path itself never participates in
/// the comparison).  Wrap in `std::cmp::Reverse` for a min-heap.
#[derive(Clone, Debug)]
pub struct SearchState {
    /// Priority: normalized time estimate plus safety penalty.
    pub f_score: f64,
    /// Travel time accumulated from the start node, seconds.
    pub time_s: f64,
    /// Maximum nearest-station distance over the nodes entered so far,
    /// metres.  Monotone non-decreasing along a prefix.
    pub max_station_dist_m: f64,
    pub node: NodeId,
    /// The full path prefix, start node first.
    pub path: Vec<NodeId>,
    /// Insertion sequence number, used as the tie-breaker.
    pub seq: u64,
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.f_score.total_cmp(&other.f_score).is_eq() && self.seq == other.seq
    }
}

impl Eq for SearchState {}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.f_score
            .total_cmp(&other.f_score)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
