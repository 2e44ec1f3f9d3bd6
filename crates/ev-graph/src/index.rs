//! Per-node nearest-charging-station index.
//!
//! The index answers, for a road node, "how far is the closest charger by
//! road?".  It is a pure function of the graph and the station catalog,
//! built offline and loaded alongside the graph; the planner only reads it.
//! Nodes absent from the index are treated as infinitely far from any
//! charger.

use std::collections::{BTreeMap, BinaryHeap};
use std::cmp::Reverse;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use ev_core::{GeoPoint, NodeId};

use crate::error::GraphResult;
use crate::graph::RoadGraph;
use crate::stations::{StationCatalog, StationLocation};

/// Road distances beyond this are not worth indexing; such nodes stay
/// absent (distance = +∞ to the search).
const MAX_INDEX_DISTANCE_M: f64 = 100_000.0;

/// The nearest charger known for one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NearestStation {
    /// Road distance from the node to the station, metres.
    pub distance_m: f64,
    pub name: String,
    pub location: GeoPoint,
}

impl NearestStation {
    /// Stable station identity: `"name|lat|lon"`.
    pub fn station_key(&self) -> String {
        format!("{}|{}|{}", self.name, self.location.lat, self.location.lon)
    }
}

// ── Serialized form ───────────────────────────────────────────────────────────

/// One record of the serialized index: `null` means "no usable station".
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexRecord {
    pub nearest_charging_station: Option<NearestRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NearestRecord {
    pub distance: f64,
    pub name: String,
    pub location: StationLocation,
}

/// On-disk layout: node-id string → record.
pub type StationIndexData = BTreeMap<String, IndexRecord>;

// ── StationIndex ──────────────────────────────────────────────────────────────

/// Loaded per-node nearest-station distances.  Read-only at query time.
#[derive(Clone, Debug, Default)]
pub struct StationIndex {
    entries: FxHashMap<NodeId, NearestStation>,
}

impl StationIndex {
    pub fn from_entries(entries: impl IntoIterator<Item = (NodeId, NearestStation)>) -> Self {
        Self { entries: entries.into_iter().collect() }
    }

    /// Remap a serialized index onto `graph`.
    ///
    /// Records with unparseable ids, ids not present in the graph, or a
    /// `null` station are skipped (the dataset may cover a superset of the
    /// graph).
    pub fn from_data(data: &StationIndexData, graph: &RoadGraph) -> Self {
        let mut entries = FxHashMap::default();
        for (id_str, record) in data {
            let Ok(ext_id) = id_str.parse::<i64>() else { continue };
            let Some(node) = graph.node_by_ext(ext_id) else { continue };
            let Some(nearest) = &record.nearest_charging_station else { continue };
            entries.insert(
                node,
                NearestStation {
                    distance_m: nearest.distance,
                    name: nearest.name.clone(),
                    location: GeoPoint::new(
                        nearest.location.latitude,
                        nearest.location.longitude,
                    ),
                },
            );
        }
        log::info!("station index covers {} of {} nodes", entries.len(), graph.node_count());
        Self { entries }
    }

    /// Load the serialized index from disk and remap it onto `graph`.
    pub fn load(path: &Path, graph: &RoadGraph) -> GraphResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let data: StationIndexData = serde_json::from_reader(reader)?;
        Ok(Self::from_data(&data, graph))
    }

    /// Export in the on-disk layout (keys are dataset node ids).
    pub fn to_data(&self, graph: &RoadGraph) -> StationIndexData {
        self.entries
            .iter()
            .map(|(&node, nearest)| {
                (
                    graph.ext_id(node).to_string(),
                    IndexRecord {
                        nearest_charging_station: Some(NearestRecord {
                            distance: nearest.distance_m,
                            name: nearest.name.clone(),
                            location: StationLocation {
                                latitude: nearest.location.lat,
                                longitude: nearest.location.lon,
                            },
                        }),
                    },
                )
            })
            .collect()
    }

    /// Road distance from `node` to its nearest charger; `+∞` when unknown.
    #[inline]
    pub fn distance_to_nearest(&self, node: NodeId) -> f64 {
        self.entries.get(&node).map_or(f64::INFINITY, |n| n.distance_m)
    }

    /// The nearest-station record for `node`, if indexed.
    pub fn station_of(&self, node: NodeId) -> Option<&NearestStation> {
        self.entries.get(&node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ── Offline construction ──────────────────────────────────────────────

    /// Build the index from scratch (the offline pipeline step).
    ///
    /// One multi-source Dijkstra over the undirected graph, seeded at every
    /// charging-station node (distance 0) and at each catalog station's
    /// snap node (seeded with the station→snap straight-line gap), yields
    /// the road distance *and* the identity of the nearest station for all
    /// reachable nodes at once.  Nodes unreachable from every seed fall
    /// back to straight-line distance (scanned in parallel); anything
    /// beyond 100 km is left out of the index.
    pub fn build(graph: &RoadGraph, catalog: &StationCatalog) -> Self {
        let n = graph.node_count();

        // Seed identities, referenced by index from the Dijkstra labels.
        let mut seeds: Vec<(NodeId, f64, NearestStation)> = Vec::new();

        for i in 0..n {
            let node = NodeId(i as u32);
            if graph.is_charging_station(node) {
                let name = graph
                    .station_name(node)
                    .unwrap_or("Unknown Station")
                    .to_string();
                seeds.push((
                    node,
                    0.0,
                    NearestStation { distance_m: 0.0, name, location: graph.pos(node) },
                ));
            }
        }
        for station in catalog.iter() {
            if let Some((snap, gap)) = graph.nearest_node(station.point()) {
                seeds.push((
                    snap,
                    gap,
                    NearestStation {
                        distance_m: 0.0,
                        name: station.name.clone(),
                        location: station.point(),
                    },
                ));
            }
        }

        if seeds.is_empty() {
            return Self::default();
        }

        // Undirected hop lengths: edge length, or straight-line when absent.
        let hop = |e: usize| -> f64 {
            let len = graph.edge_length_m[e];
            if len.is_finite() {
                len
            } else {
                graph.pos(graph.edge_from[e]).distance_m(graph.pos(graph.edge_to[e]))
            }
        };
        let mut undirected: Vec<Vec<(NodeId, f64)>> = vec![Vec::new(); n];
        for e in 0..graph.edge_count() {
            let (u, v) = (graph.edge_from[e], graph.edge_to[e]);
            let w = hop(e);
            undirected[u.index()].push((v, w));
            undirected[v.index()].push((u, w));
        }

        // Multi-source Dijkstra with seed labels.
        let mut dist = vec![f64::INFINITY; n];
        let mut label = vec![u32::MAX; n];
        let mut heap: BinaryHeap<Reverse<DijkstraEntry>> = BinaryHeap::new();
        for (i, (node, gap, _)) in seeds.iter().enumerate() {
            if *gap < dist[node.index()] {
                dist[node.index()] = *gap;
                label[node.index()] = i as u32;
                heap.push(Reverse(DijkstraEntry { dist: *gap, node: *node }));
            }
        }
        while let Some(Reverse(entry)) = heap.pop() {
            if entry.dist > dist[entry.node.index()] {
                continue; // stale
            }
            let l = label[entry.node.index()];
            for &(next, w) in &undirected[entry.node.index()] {
                let d = entry.dist + w;
                if d < dist[next.index()] {
                    dist[next.index()] = d;
                    label[next.index()] = l;
                    heap.push(Reverse(DijkstraEntry { dist: d, node: next }));
                }
            }
        }

        let mut entries = FxHashMap::default();
        let mut unreached: Vec<NodeId> = Vec::new();
        for i in 0..n {
            let node = NodeId(i as u32);
            if dist[i].is_finite() {
                if dist[i] <= MAX_INDEX_DISTANCE_M {
                    let seed = &seeds[label[i] as usize].2;
                    entries.insert(
                        node,
                        NearestStation { distance_m: dist[i], ..seed.clone() },
                    );
                }
            } else {
                unreached.push(node);
            }
        }

        // No road path to any charger: fall back to straight-line distance.
        if !unreached.is_empty() {
            log::warn!(
                "{} nodes have no road path to a charging station; using straight-line distance",
                unreached.len()
            );
            let fallback: Vec<(NodeId, NearestStation)> = unreached
                .par_iter()
                .filter_map(|&node| {
                    let (station, d) = catalog.nearest(graph.pos(node))?;
                    (d <= MAX_INDEX_DISTANCE_M).then(|| {
                        (
                            node,
                            NearestStation {
                                distance_m: d,
                                name: station.name.clone(),
                                location: station.point(),
                            },
                        )
                    })
                })
                .collect();
            entries.extend(fallback);
        }

        log::info!("built station index for {} of {} nodes", entries.len(), n);
        Self { entries }
    }
}

// ── Dijkstra heap entry ───────────────────────────────────────────────────────

#[derive(PartialEq)]
struct DijkstraEntry {
    dist: f64,
    node: NodeId,
}

impl Eq for DijkstraEntry {}

impl Ord for DijkstraEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Secondary key NodeId makes ordering total and deterministic.
        self.dist.total_cmp(&other.dist).then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for DijkstraEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
