//! Two-segment planning around an intermediate charging stop.
//!
//! Invoked when the direct search rejected every goal-reaching path on
//! energy grounds.  The infeasibility reports point at the charging
//! stations nearest to where the battery window closed; the journey is
//! split there, with a full recharge between the legs.  No recursion: if a
//! leg is itself infeasible the plan fails.

use rustc_hash::FxHashMap;

use ev_core::{BatteryParams, NodeId};
use ev_search::{InfeasibleReport, ReportedStation, SearchContext, SearchLimits, filter_similar_routes, find_pareto_paths};

use crate::error::PlanError;
use crate::types::{ChargingStop, PlannedRoute};

/// Routes plus the stop they pivot on.
pub(crate) struct TwoSegmentPlan {
    pub routes: Vec<PlannedRoute>,
    pub stop: ChargingStop,
}

/// Pick the charging station of the first report group, in insertion order.
///
/// Reports are grouped by station identity; several rejected paths usually
/// hand off near the same station.
fn select_station(reports: &[InfeasibleReport]) -> Option<&ReportedStation> {
    let mut groups: FxHashMap<String, usize> = FxHashMap::default();
    let mut first: Option<&ReportedStation> = None;
    for report in reports {
        let Some(station) = &report.nearest_station else { continue };
        *groups.entry(station.station_key()).or_insert(0) += 1;
        if first.is_none() {
            first = Some(station);
        }
    }
    if let Some(station) = first {
        log::info!(
            "two-segment: {} candidate stations across {} reports, using {}",
            groups.len(),
            reports.len(),
            station.name
        );
    }
    first
}

/// Compose two Pareto searches around the selected charging stop.
pub(crate) fn plan_two_segment(
    ctx: &SearchContext<'_>,
    reports: &[InfeasibleReport],
    start: NodeId,
    end: NodeId,
    battery: &BatteryParams,
    limits: &SearchLimits,
) -> Result<TwoSegmentPlan, PlanError> {
    let station = select_station(reports)
        .ok_or_else(|| PlanError::NoFeasibleRoute { infeasible: reports.to_vec() })?;

    let (stop_node, stop_dist) = ctx
        .graph
        .nearest_node(station.location)
        .ok_or_else(|| PlanError::InvalidAddress(format!(
            "charging station '{}' cannot be snapped to the road graph",
            station.name
        )))?;
    log::info!(
        "two-segment: charging stop '{}' snaps to node {} ({:.1} m away)",
        station.name,
        ctx.graph.ext_id(stop_node),
        stop_dist
    );

    let cap = ctx.config.leg_max_paths;

    // Leg 1: origin → stop, on the requested battery window.
    let leg1 = find_pareto_paths(ctx, start, stop_node, battery, cap, limits)?;
    // Leg 2: stop → destination, departing fully recharged.
    let recharged = battery.recharged_to(ctx.config.charge_target_soc);
    let leg2 = find_pareto_paths(ctx, stop_node, end, &recharged, cap, limits)?;

    if leg1.routes.is_empty() {
        return Err(PlanError::TwoSegmentUnreachable { leg: 1 });
    }
    if leg2.routes.is_empty() {
        return Err(PlanError::TwoSegmentUnreachable { leg: 2 });
    }

    let leg1_routes = filter_similar_routes(leg1.routes, ctx.config.similarity_threshold);
    let leg2_routes = filter_similar_routes(leg2.routes, ctx.config.similarity_threshold);

    let mut routes = Vec::with_capacity(leg1_routes.len() + leg2_routes.len());

    for (i, route) in leg1_routes.iter().enumerate() {
        let charging_time_s = ev_energy::charging_time_s(
            route.remaining_soc,
            ctx.config.charge_target_soc,
            ctx.config.charging_rate_pct_per_min,
        );
        let mut planned = PlannedRoute::from_pareto(route, ctx.graph);
        planned.charging_time_s = Some(charging_time_s);
        planned.total_time_s = Some(route.time_s + charging_time_s);
        planned.leg = Some(1);
        planned.leg_index = Some(i + 1);
        routes.push(planned);
    }

    for (i, route) in leg2_routes.iter().enumerate() {
        let mut planned = PlannedRoute::from_pareto(route, ctx.graph);
        planned.leg = Some(2);
        planned.leg_index = Some(i + 1);
        routes.push(planned);
    }

    Ok(TwoSegmentPlan {
        routes,
        stop: ChargingStop {
            station_name: station.name.clone(),
            location: station.location,
            node_ext_id: ctx.graph.ext_id(stop_node),
        },
    })
}
