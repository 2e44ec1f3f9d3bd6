//! Plan request and response surface.
//!
//! Responses carry dataset node ids (not dense internal ids) so they are
//! meaningful to whatever loaded the same dataset — a renderer, a transport
//! layer, a log line.

use serde::{Deserialize, Serialize};

use ev_core::{BatteryParams, GeoPoint};
use ev_graph::RoadGraph;
use ev_search::ParetoRoute;

/// A core-level plan request.  SOC values in percent, consumption in
/// percent per kilometre.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanRequest {
    pub origin: String,
    pub destination: String,
    pub initial_soc: f64,
    pub threshold_soc: f64,
    pub consumption: f64,
}

impl PlanRequest {
    pub fn battery(&self) -> BatteryParams {
        BatteryParams::new(self.initial_soc, self.threshold_soc, self.consumption)
    }
}

/// A resolved endpoint: the snapped graph node and how far the geocoded
/// point was from it.
#[derive(Clone, Debug, Serialize)]
pub struct Endpoint {
    pub node_ext_id: i64,
    pub location: GeoPoint,
    pub snap_distance_m: f64,
}

/// The charging stop of a two-segment plan.
#[derive(Clone, Debug, Serialize)]
pub struct ChargingStop {
    pub station_name: String,
    pub location: GeoPoint,
    pub node_ext_id: i64,
}

/// One planned route.  The charging and leg fields are present only on
/// two-segment results.
#[derive(Clone, Debug, Serialize)]
pub struct PlannedRoute {
    /// Dataset node ids, origin first.
    pub path: Vec<i64>,
    pub travel_time_s: f64,
    pub max_station_distance_m: f64,
    pub remaining_soc_pct: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_time_s: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time_s: Option<f64>,

    /// 1 = origin → charging stop, 2 = charging stop → destination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leg: Option<u8>,

    /// 1-based index within the leg.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leg_index: Option<usize>,
}

impl PlannedRoute {
    /// Convert a search result, mapping internal node ids to dataset ids.
    pub(crate) fn from_pareto(route: &ParetoRoute, graph: &RoadGraph) -> Self {
        Self {
            path: route.path.iter().map(|&n| graph.ext_id(n)).collect(),
            travel_time_s: route.time_s,
            max_station_distance_m: route.max_station_dist_m,
            remaining_soc_pct: route.remaining_soc,
            charging_time_s: None,
            total_time_s: None,
            leg: None,
            leg_index: None,
        }
    }
}

/// A successful plan outcome.
#[derive(Clone, Debug, Serialize)]
pub struct PlanResponse {
    pub origin: Endpoint,
    pub destination: Endpoint,

    /// Whether the routes form a two-segment plan around a charging stop.
    pub two_segment: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_stop: Option<ChargingStop>,

    /// Direct plans: Pareto routes by ascending travel time.  Two-segment
    /// plans: leg-1 routes first, then leg-2 routes.
    pub routes: Vec<PlannedRoute>,
}
