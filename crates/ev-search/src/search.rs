//! The Pareto A★ search loop.
//!
//! # Objectives
//!
//! Both minimized:
//! 1. `time` — cumulative edge travel time from the start node;
//! 2. `maxdist` — maximum nearest-station distance over the nodes the path
//!    enters (monotone non-decreasing along any prefix).
//!
//! # Priority
//!
//! States are expanded best-first by an f-score mixing progress and safety:
//!
//! ```text
//! h(n)          = degree_distance(n, goal) · 111000 / 16.67   (seconds)
//! safety(d)     = d / 10000                         d ≤ 10 km
//!               = 1 + 0.5·log10(1 + (d−10000)/10000)  otherwise
//! f             = (time + h) / 3600 + safety(maxdist)
//! ```
//!
//! The heuristic is a time-only straight-line estimate at 60 km/h.  The
//! ordering is deliberately non-optimal for either single objective: paired
//! with per-node dominance pruning it sweeps out a Pareto set instead of a
//! single optimum, and the search keeps running after the first goal hit
//! until the frontier drains or the accepted set reaches its cap.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ev_core::{BatteryParams, NodeId, PlannerConfig};
use ev_graph::{RoadGraph, StationCatalog, StationIndex};

use crate::dominance::DominanceTable;
use crate::error::SearchError;
use crate::filter::filter_similar_routes;
use crate::limits::SearchLimits;
use crate::pareto::{ParetoRoute, ParetoSet};
use crate::report::{InfeasibleReport, ReportedStation};
use crate::state::SearchState;

/// Heuristic speed assumption: 60 km/h in m/s.
const HEURISTIC_SPEED_MPS: f64 = 60.0 * 1000.0 / 3600.0;

/// Metres per degree used by the heuristic's flat-earth conversion.
const METERS_PER_DEGREE: f64 = 111_000.0;

/// Normalizers of the f-score mix.
const TIME_NORM_S: f64 = 3_600.0;
const DIST_NORM_M: f64 = 10_000.0;

/// Read-only inputs shared by every search a planner runs.
#[derive(Copy, Clone)]
pub struct SearchContext<'a> {
    pub graph: &'a RoadGraph,
    pub stations: &'a StationIndex,
    pub catalog: &'a StationCatalog,
    pub config: &'a PlannerConfig,
}

/// Everything one search produced.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Accepted routes, sorted by travel time ascending, similarity-filtered.
    pub routes: Vec<ParetoRoute>,
    /// One report per goal-reaching path that failed the feasibility check.
    pub infeasible: Vec<InfeasibleReport>,
}

/// Safety penalty of a maxdist value: linear inside 10 km, logarithmic
/// beyond so a single remote stretch cannot drown the time term entirely.
fn safety_score(dist_m: f64) -> f64 {
    if dist_m <= DIST_NORM_M {
        dist_m / DIST_NORM_M
    } else {
        1.0 + 0.5 * (1.0 + (dist_m - DIST_NORM_M) / DIST_NORM_M).log10()
    }
}

/// Find up to `max_paths` Pareto-optimal loop-free routes from `start` to
/// `end`.
///
/// Returns the accepted set (possibly empty) together with infeasibility
/// reports; `Err` only on cancellation or deadline expiry, in which case no
/// partial result is published.
pub fn find_pareto_paths(
    ctx: &SearchContext<'_>,
    start: NodeId,
    end: NodeId,
    battery: &BatteryParams,
    max_paths: usize,
    limits: &SearchLimits,
) -> Result<SearchOutcome, SearchError> {
    let graph = ctx.graph;
    let goal_pos = graph.pos(end);
    let h = |node: NodeId| -> f64 {
        graph.pos(node).degree_distance(goal_pos) * METERS_PER_DEGREE / HEURISTIC_SPEED_MPS
    };

    let mut frontier: BinaryHeap<Reverse<SearchState>> = BinaryHeap::new();
    let mut visited = DominanceTable::new(ctx.config.dominance_cap);
    let mut accepted = ParetoSet::new(ctx.config.dominance_tolerance);
    let mut reports: Vec<InfeasibleReport> = Vec::new();
    let mut seq: u64 = 0;
    let mut overflowed = false;

    frontier.push(Reverse(SearchState {
        f_score: h(start) / TIME_NORM_S,
        time_s: 0.0,
        max_station_dist_m: 0.0,
        node: start,
        path: vec![start],
        seq,
    }));

    loop {
        if accepted.len() >= max_paths {
            break;
        }
        let Some(Reverse(state)) = frontier.pop() else {
            break;
        };

        limits.check()?;

        if visited.is_dominated(state.node, state.time_s, state.max_station_dist_m) {
            continue;
        }
        visited.insert(state.node, state.time_s, state.max_station_dist_m);

        // ── Goal handling ─────────────────────────────────────────────────
        //
        // Paths are loop-free, so nothing extended past the goal can reach
        // it again; goal states are never expanded.
        if state.node == end {
            let distance_m = ev_energy::path_distance_m(graph, &state.path);
            let soc = ev_energy::remaining_soc(battery, distance_m);

            if soc < battery.threshold_soc {
                reports.push(build_report(ctx, &state.path, soc, battery, reports.len() + 1));
                continue;
            }

            accepted.try_accept(ParetoRoute {
                path: state.path,
                time_s: state.time_s,
                max_station_dist_m: state.max_station_dist_m,
                remaining_soc: soc,
            });
            continue;
        }

        // ── Expansion ─────────────────────────────────────────────────────
        for edge in graph.out_edges(state.node) {
            let neighbor = graph.edge_to[edge.index()];
            if state.path.contains(&neighbor) {
                continue; // loop-free paths only
            }

            let new_time = state.time_s + graph.travel_time_s(edge);
            let new_max = state
                .max_station_dist_m
                .max(ctx.stations.distance_to_nearest(neighbor));

            if visited.is_dominated(neighbor, new_time, new_max) {
                continue;
            }

            if frontier.len() >= ctx.config.frontier_cap {
                if !overflowed {
                    log::warn!(
                        "frontier cap {} reached; dropping further states",
                        ctx.config.frontier_cap
                    );
                    overflowed = true;
                }
                continue;
            }

            let f_score = (new_time + h(neighbor)) / TIME_NORM_S + safety_score(new_max);
            let mut path = state.path.clone();
            path.push(neighbor);
            seq += 1;
            frontier.push(Reverse(SearchState {
                f_score,
                time_s: new_time,
                max_station_dist_m: new_max,
                node: neighbor,
                path,
                seq,
            }));
        }
    }

    let routes = accepted.into_sorted_truncated(max_paths);
    let routes = filter_similar_routes(routes, ctx.config.similarity_threshold);

    log::debug!(
        "search {} -> {}: {} routes, {} infeasible paths",
        graph.ext_id(start),
        graph.ext_id(end),
        routes.len(),
        reports.len()
    );

    Ok(SearchOutcome { routes, infeasible: reports })
}

/// Assemble the report for a goal-reaching path that misses the threshold:
/// walk the detour budget to the hand-off node and scan the catalog for the
/// station nearest to it.
fn build_report(
    ctx: &SearchContext<'_>,
    path: &[NodeId],
    remaining_soc: f64,
    battery: &BatteryParams,
    path_index: usize,
) -> InfeasibleReport {
    let graph = ctx.graph;
    let budget_m = ev_energy::detour_budget_m(battery, ctx.config.safety_factor);
    let last_reachable_index = ev_energy::last_reachable_index(graph, path, budget_m);
    let last_node = path[last_reachable_index];
    let last_node_pos = graph.pos(last_node);

    let nearest_station = ctx.catalog.nearest(last_node_pos).map(|(station, distance_m)| {
        ReportedStation {
            name: station.name.clone(),
            location: station.point(),
            distance_m,
        }
    });

    log::debug!(
        "path #{path_index} infeasible: {remaining_soc:.1}% < {:.1}%, hand-off at node {}",
        battery.threshold_soc,
        graph.ext_id(last_node)
    );

    InfeasibleReport {
        path_index,
        remaining_soc,
        threshold_soc: battery.threshold_soc,
        total_nodes: path.len(),
        last_reachable_index,
        last_node_ext_id: graph.ext_id(last_node),
        last_node_pos,
        nearest_station,
    }
}
