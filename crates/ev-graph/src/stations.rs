//! Charging-station catalog.
//!
//! The catalog is the raw station list produced by the offline acquisition
//! pipeline: an array of `{ name, location: { latitude, longitude }, tags?,
//! region? }` records.  At query time it is only scanned for
//! nearest-by-air-distance lookups.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use ev_core::GeoPoint;

use crate::error::GraphResult;

/// Station coordinates in the catalog's field naming.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// One catalog record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChargingStation {
    pub name: String,
    pub location: StationLocation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<serde_json::Map<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl ChargingStation {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.location.latitude, self.location.longitude)
    }

    /// Stable station identity used by infeasibility reports and the
    /// two-segment planner: `"name|lat|lon"`.
    pub fn station_key(&self) -> String {
        format!("{}|{}|{}", self.name, self.location.latitude, self.location.longitude)
    }
}

/// The loaded station catalog.
#[derive(Clone, Debug, Default)]
pub struct StationCatalog {
    stations: Vec<ChargingStation>,
}

impl StationCatalog {
    pub fn new(stations: Vec<ChargingStation>) -> Self {
        Self { stations }
    }

    /// Load the JSON station array from disk.
    pub fn load(path: &Path) -> GraphResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let stations: Vec<ChargingStation> = serde_json::from_reader(reader)?;
        log::info!("loaded {} charging stations from {}", stations.len(), path.display());
        Ok(Self { stations })
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChargingStation> {
        self.stations.iter()
    }

    /// Station nearest to `pos` by haversine distance, with that distance in
    /// metres.  Linear scan over the catalog.
    pub fn nearest(&self, pos: GeoPoint) -> Option<(&ChargingStation, f64)> {
        self.stations
            .iter()
            .map(|s| (s, s.point().distance_m(pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
