//! Address resolution seam.
//!
//! Geocoding is an external collaborator: the planner only needs "address in,
//! coordinates out".  Applications plug in a real resolver; tests and offline
//! replay use [`StaticGeocoder`].

use rustc_hash::FxHashMap;

use ev_core::GeoPoint;

/// Resolve a free-form address to WGS-84 coordinates.
///
/// Implementations must be `Send + Sync`; one geocoder may serve concurrent
/// plan calls.
pub trait Geocoder: Send + Sync {
    /// `None` when the address cannot be resolved.
    fn geocode(&self, address: &str) -> Option<GeoPoint>;
}

/// Exact-match table geocoder.
#[derive(Clone, Debug, Default)]
pub struct StaticGeocoder {
    entries: FxHashMap<String, GeoPoint>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: &str, point: GeoPoint) {
        self.entries.insert(address.to_string(), point);
    }
}

impl FromIterator<(String, GeoPoint)> for StaticGeocoder {
    fn from_iter<T: IntoIterator<Item = (String, GeoPoint)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode(&self, address: &str) -> Option<GeoPoint> {
        self.entries.get(address).copied()
    }
}
