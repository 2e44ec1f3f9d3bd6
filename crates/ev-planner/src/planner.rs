//! The query orchestrator.

use std::path::Path;

use ev_core::{BatteryParams, ComponentPolicy, GeoPoint, NodeId, PlannerConfig};
use ev_graph::{RoadGraph, StationCatalog, StationIndex, load_road_graph};
use ev_search::{SearchContext, SearchLimits, find_pareto_paths};

use crate::error::PlanError;
use crate::geocode::Geocoder;
use crate::two_segment::plan_two_segment;
use crate::types::{Endpoint, PlanRequest, PlanResponse, PlannedRoute};

/// Owns the loaded datasets and answers plan requests.
///
/// All owned data is immutable after construction; one planner serves any
/// number of concurrent [`plan`](Self::plan) calls.
#[derive(Debug)]
pub struct RoutePlanner {
    graph: RoadGraph,
    stations: StationIndex,
    catalog: StationCatalog,
    config: PlannerConfig,
}

impl RoutePlanner {
    /// Assemble a planner from already-loaded data.
    pub fn new(
        graph: RoadGraph,
        stations: StationIndex,
        catalog: StationCatalog,
        config: PlannerConfig,
    ) -> Result<Self, PlanError> {
        config.validate()?;
        if graph.is_empty() {
            return Err(PlanError::DataUnavailable("road graph has no nodes".to_string()));
        }
        Ok(Self { graph, stations, catalog, config })
    }

    /// Load all three datasets from disk.
    ///
    /// A missing file is a [`PlanError::DataUnavailable`]; malformed content
    /// surfaces as [`PlanError::Graph`].
    pub fn load(
        graph_path: &Path,
        index_path: &Path,
        catalog_path: &Path,
        config: PlannerConfig,
    ) -> Result<Self, PlanError> {
        for path in [graph_path, index_path, catalog_path] {
            if !path.exists() {
                return Err(PlanError::DataUnavailable(path.display().to_string()));
            }
        }
        let graph = load_road_graph(graph_path)?;
        let catalog = StationCatalog::load(catalog_path)?;
        let stations = StationIndex::load(index_path, &graph)?;
        Self::new(graph, stations, catalog, config)
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn ctx(&self) -> SearchContext<'_> {
        SearchContext {
            graph: &self.graph,
            stations: &self.stations,
            catalog: &self.catalog,
            config: &self.config,
        }
    }

    /// Answer one plan request.
    ///
    /// Pipeline: validate → geocode → snap → connectivity → direct Pareto
    /// search → (on energy-infeasibility) two-segment fallback.
    pub fn plan(
        &self,
        request: &PlanRequest,
        geocoder: &dyn Geocoder,
        limits: &SearchLimits,
    ) -> Result<PlanResponse, PlanError> {
        log::info!(
            "planning {} -> {} (soc {:.0}% threshold {:.0}% consumption {} %/km)",
            request.origin,
            request.destination,
            request.initial_soc,
            request.threshold_soc,
            request.consumption
        );

        let origin_pos = geocoder
            .geocode(&request.origin)
            .ok_or_else(|| PlanError::InvalidAddress(request.origin.clone()))?;
        let dest_pos = geocoder
            .geocode(&request.destination)
            .ok_or_else(|| PlanError::InvalidAddress(request.destination.clone()))?;

        self.plan_between(origin_pos, dest_pos, request.battery(), limits)
    }

    /// Plan between already-resolved coordinates (no geocoder involved).
    pub fn plan_between(
        &self,
        origin_pos: GeoPoint,
        dest_pos: GeoPoint,
        battery: BatteryParams,
        limits: &SearchLimits,
    ) -> Result<PlanResponse, PlanError> {
        battery.validate()?;

        let (start, end) = self.resolve_endpoints(origin_pos, dest_pos)?;

        // Informational only: a request whose straight-line distance already
        // exceeds the battery range is very likely headed for a charge stop.
        let straight_km = origin_pos.distance_m(dest_pos) / 1_000.0;
        if straight_km > battery.range_km() {
            log::warn!(
                "straight-line distance {:.1} km exceeds battery range {:.1} km",
                straight_km,
                battery.range_km()
            );
        }

        let origin = self.endpoint(start, origin_pos);
        let destination = self.endpoint(end, dest_pos);

        let outcome =
            find_pareto_paths(&self.ctx(), start, end, &battery, self.config.max_paths, limits)?;

        if !outcome.routes.is_empty() {
            let routes = outcome
                .routes
                .iter()
                .map(|r| PlannedRoute::from_pareto(r, &self.graph))
                .collect();
            return Ok(PlanResponse {
                origin,
                destination,
                two_segment: false,
                charging_stop: None,
                routes,
            });
        }

        if outcome.infeasible.is_empty() {
            return Err(PlanError::NoFeasibleRoute { infeasible: vec![] });
        }

        log::info!("no feasible direct route; attempting two-segment plan");
        let plan =
            plan_two_segment(&self.ctx(), &outcome.infeasible, start, end, &battery, limits)?;
        Ok(PlanResponse {
            origin,
            destination,
            two_segment: true,
            charging_stop: Some(plan.stop),
            routes: plan.routes,
        })
    }

    // ── Endpoint resolution ───────────────────────────────────────────────

    fn endpoint(&self, node: NodeId, queried: GeoPoint) -> Endpoint {
        Endpoint {
            node_ext_id: self.graph.ext_id(node),
            location: self.graph.pos(node),
            snap_distance_m: self.graph.pos(node).distance_m(queried),
        }
    }

    /// Snap both endpoints and make sure a route between them can exist at
    /// all (any path, objectives ignored).
    fn resolve_endpoints(
        &self,
        origin_pos: GeoPoint,
        dest_pos: GeoPoint,
    ) -> Result<(NodeId, NodeId), PlanError> {
        let (start, start_dist) = self
            .graph
            .nearest_node(origin_pos)
            .ok_or_else(|| PlanError::InvalidAddress("origin has no nearby road node".into()))?;
        let (end, end_dist) = self
            .graph
            .nearest_node(dest_pos)
            .ok_or_else(|| PlanError::InvalidAddress("destination has no nearby road node".into()))?;
        log::debug!(
            "snapped endpoints: {} ({start_dist:.1} m), {} ({end_dist:.1} m)",
            self.graph.ext_id(start),
            self.graph.ext_id(end)
        );

        if self.graph.is_reachable(start, end) {
            return Ok((start, end));
        }

        let components = self.graph.weak_components();
        let component_of = |node: NodeId| components.iter().position(|c| c.contains(&node));
        let same_component = component_of(start) == component_of(end);

        if same_component || self.config.component_policy == ComponentPolicy::Strict {
            return Err(PlanError::InvalidAddress(
                "no road connection between origin and destination".into(),
            ));
        }

        // Re-snap policy: both endpoints move into the largest component and
        // planning continues there; the response reports the moved nodes.
        let largest = &components[0];
        let (new_start, d1) = self
            .graph
            .nearest_node_in(origin_pos, largest)
            .ok_or_else(|| PlanError::InvalidAddress("origin has no nearby road node".into()))?;
        let (new_end, d2) = self
            .graph
            .nearest_node_in(dest_pos, largest)
            .ok_or_else(|| PlanError::InvalidAddress("destination has no nearby road node".into()))?;
        log::warn!(
            "endpoints lie in different components; re-snapped to largest component \
             (origin {:.1} m, destination {:.1} m away)",
            d1,
            d2
        );
        Ok((new_start, new_end))
    }
}
