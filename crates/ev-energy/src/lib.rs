//! `ev-energy` — the linear battery model.
//!
//! Pure functions over a path and its graph: no state, no I/O.  SOC drains
//! linearly with driven distance (`BatteryParams::consumption_pct_per_km`)
//! and recovers at a constant charging rate.
//!
//! | Function                | Contract                                        |
//! |-------------------------|-------------------------------------------------|
//! | [`path_distance_m`]     | Sum of per-hop lengths along a node path        |
//! | [`remaining_soc`]       | `max(0, initial − km · consumption)`            |
//! | [`is_feasible`]         | remaining SOC ≥ threshold                       |
//! | [`charging_time_s`]     | time to charge up to a target SOC               |
//! | [`detour_budget_m`]     | usable distance before a charge stop is forced  |
//! | [`last_reachable_index`]| furthest path node within a distance budget     |

use ev_core::{BatteryParams, NodeId};
use ev_graph::RoadGraph;

/// Distance of one path hop in metres.
///
/// Prefers the stored edge length; falls back to the straight-line distance
/// between the endpoints; a hop that resolves to a non-finite distance is
/// charged a conservative 500 m so energy use is never underestimated.
pub fn hop_distance_m(graph: &RoadGraph, u: NodeId, v: NodeId) -> f64 {
    let by_edge = graph
        .edge_between(u, v)
        .map(|e| graph.edge_length_m[e.index()])
        .unwrap_or(f64::NAN);
    let d = if by_edge.is_finite() {
        by_edge
    } else {
        graph.pos(u).distance_m(graph.pos(v))
    };
    if d.is_finite() { d } else { 500.0 }
}

/// Total driven distance along `path`, in metres.
pub fn path_distance_m(graph: &RoadGraph, path: &[NodeId]) -> f64 {
    path.windows(2).map(|w| hop_distance_m(graph, w[0], w[1])).sum()
}

/// SOC left after driving `distance_m` metres, clamped at 0.
pub fn remaining_soc(battery: &BatteryParams, distance_m: f64) -> f64 {
    let consumed = distance_m / 1_000.0 * battery.consumption_pct_per_km;
    (battery.initial_soc - consumed).max(0.0)
}

/// Does driving `distance_m` metres leave at least the threshold SOC?
pub fn is_feasible(battery: &BatteryParams, distance_m: f64) -> bool {
    remaining_soc(battery, distance_m) >= battery.threshold_soc
}

/// Seconds needed to charge from `current_soc` up to `target_soc` at
/// `rate_pct_per_min`.  Zero when already at or above the target.
pub fn charging_time_s(current_soc: f64, target_soc: f64, rate_pct_per_min: f64) -> f64 {
    (target_soc - current_soc).max(0.0) / rate_pct_per_min * 60.0
}

/// Distance budget (metres) usable before the SOC window closes, with a
/// safety margin applied.
///
/// Locates the hand-off point of an infeasible path: the vehicle can detour
/// up to `safety_factor · (initial − threshold)` percentage points of
/// charge, which at the linear rate converts to metres.
pub fn detour_budget_m(battery: &BatteryParams, safety_factor: f64) -> f64 {
    let available_soc = safety_factor * (battery.initial_soc - battery.threshold_soc);
    available_soc / battery.consumption_pct_per_km * 1_000.0
}

/// Index of the last node of `path` still within `budget_m` driven metres.
///
/// Walks hop distances cumulatively from the start; returns 0 when even the
/// first hop overruns the budget.
pub fn last_reachable_index(graph: &RoadGraph, path: &[NodeId], budget_m: f64) -> usize {
    let mut cumulative = 0.0;
    let mut last = 0;
    for (j, w) in path.windows(2).enumerate() {
        cumulative += hop_distance_m(graph, w[0], w[1]);
        if cumulative > budget_m {
            break;
        }
        last = j + 1;
    }
    last
}

#[cfg(test)]
mod tests;
