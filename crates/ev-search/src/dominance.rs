//! Per-node dominance frontier.
//!
//! A state `(node, time, dist)` is worth expanding only if no previously
//! retained state at the same node is at least as good on both objectives.
//! The comparison here is **strict** (no tolerance): a tolerant state-level
//! prune could discard states whose extensions are genuinely non-dominated.
//! The goal-level Pareto set applies the tolerance instead.

use rustc_hash::FxHashMap;

use ev_core::NodeId;

/// Retained `(time, max_station_dist)` pairs per node.
///
/// Each node keeps at most `cap` entries; beyond that the lexicographically
/// largest `(time, dist)` pairs are dropped first.  The cap bounds memory on
/// adversarial graphs where the true frontier per node can grow without
/// limit.
pub struct DominanceTable {
    states: FxHashMap<NodeId, Vec<(f64, f64)>>,
    cap: usize,
}

impl DominanceTable {
    pub fn new(cap: usize) -> Self {
        Self { states: FxHashMap::default(), cap }
    }

    /// Is `(time, dist)` weakly dominated by a retained entry at `node`?
    pub fn is_dominated(&self, node: NodeId, time: f64, dist: f64) -> bool {
        self.states
            .get(&node)
            .is_some_and(|entries| entries.iter().any(|&(t, d)| t <= time && d <= dist))
    }

    /// Retain `(time, dist)` at `node`, dropping entries it weakly dominates.
    pub fn insert(&mut self, node: NodeId, time: f64, dist: f64) {
        let entries = self.states.entry(node).or_default();
        entries.retain(|&(t, d)| !(time <= t && dist <= d));
        entries.push((time, dist));

        while entries.len() > self.cap {
            let worst = entries
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.0.total_cmp(&b.1.0).then(a.1.1.total_cmp(&b.1.1)))
                .map(|(i, _)| i)
                .unwrap();
            entries.swap_remove(worst);
        }
    }

    /// Number of retained entries at `node`.
    pub fn entries_at(&self, node: NodeId) -> usize {
        self.states.get(&node).map_or(0, Vec::len)
    }

    /// Largest per-node frontier currently retained.
    pub fn max_entries(&self) -> usize {
        self.states.values().map(Vec::len).max().unwrap_or(0)
    }
}
