//! Infeasibility reporting.
//!
//! Every goal-reaching path rejected on energy grounds produces a report:
//! where the vehicle would actually run out of usable charge, and which
//! charging station sits closest to that point.  The two-segment planner
//! consumes these to pick an intermediate charging stop, and they accompany
//! a `NoFeasibleRoute` outcome so callers can explain the failure.

use serde::Serialize;

use ev_core::GeoPoint;

/// The charging station nearest (by air) to a report's hand-off node.
#[derive(Clone, Debug, Serialize)]
pub struct ReportedStation {
    pub name: String,
    pub location: GeoPoint,
    /// Straight-line distance from the hand-off node, metres.
    pub distance_m: f64,
}

impl ReportedStation {
    /// Stable station identity: `"name|lat|lon"`.
    pub fn station_key(&self) -> String {
        format!("{}|{}|{}", self.name, self.location.lat, self.location.lon)
    }
}

/// Why one explored path was rejected.
#[derive(Clone, Debug, Serialize)]
pub struct InfeasibleReport {
    /// 1-based discovery order among this search's infeasible paths.
    pub path_index: usize,
    /// SOC the path would arrive with, percent.
    pub remaining_soc: f64,
    /// The threshold it failed to meet, percent.
    pub threshold_soc: f64,
    /// Length of the rejected path, in nodes.
    pub total_nodes: usize,
    /// Index into the path of the last node within the detour budget.
    pub last_reachable_index: usize,
    /// Dataset id of that node.
    pub last_node_ext_id: i64,
    pub last_node_pos: GeoPoint,
    /// Nearest station to the hand-off node, if the catalog has any.
    pub nearest_station: Option<ReportedStation>,
}

impl InfeasibleReport {
    /// Station identity for grouping, when a station was found.
    pub fn station_key(&self) -> Option<String> {
        self.nearest_station.as_ref().map(ReportedStation::station_key)
    }
}
