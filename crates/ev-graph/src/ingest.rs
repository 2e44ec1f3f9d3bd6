//! Serialized road-graph dataset: ingest and export.
//!
//! # Dataset layout
//!
//! The dataset is the JSON document produced by the offline acquisition
//! pipeline:
//!
//! ```text
//! {
//!   "directed": true, "multigraph": true, "graph": { ...metadata... },
//!   "nodes": { "<id>": { "y": lat, "x": lon, "street_count"?,
//!                        "is_charging_station"?, "station_name"? }, ... },
//!   "edges": [ { "source", "target", "key", "length"?, "travel_time"?,
//!                "highway"?, "oneway"?, "reversed"?, ... }, ... ]
//! }
//! ```
//!
//! Every edge record is one directed edge; two-way roads appear as two
//! records (the return one tagged `reversed`).  Unmodeled passthrough
//! fields (`geometry`, `osmid`, `name`, ...) are dropped on ingest.
//!
//! # Travel-time synthesis
//!
//! An edge without `travel_time` gets `length / class_speed`; an edge with
//! neither `travel_time` nor `length` costs a flat 60 s.  After ingest every
//! edge has a positive finite travel time.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use ev_core::GeoPoint;

use crate::class::{HighwayClass, synthesize_travel_time};
use crate::error::{GraphError, GraphResult};
use crate::graph::{EdgeSpec, RoadGraph, RoadGraphBuilder};

// ── Serde model ───────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

/// Top-level dataset document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoadGraphData {
    #[serde(default = "default_true")]
    pub directed: bool,

    #[serde(default = "default_true")]
    pub multigraph: bool,

    /// Free-form provenance metadata; not interpreted.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub graph: serde_json::Map<String, serde_json::Value>,

    pub nodes: BTreeMap<String, NodeRecord>,

    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Latitude.
    pub y: f64,
    /// Longitude.
    pub x: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_count: Option<u32>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_charging_station: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,

    #[serde(default)]
    pub key: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highway: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oneway: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversed: Option<bool>,
}

// ── Ingest / export ───────────────────────────────────────────────────────────

fn parse_ext_id(s: &str) -> GraphResult<i64> {
    s.parse::<i64>()
        .map_err(|_| GraphError::Parse(format!("node id '{s}' is not an integer")))
}

impl RoadGraph {
    /// Materialize the in-memory graph from a dataset document.
    pub fn from_data(data: &RoadGraphData) -> GraphResult<RoadGraph> {
        if data.nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }

        let mut builder = RoadGraphBuilder::with_capacity(data.nodes.len(), data.edges.len());

        for (id_str, record) in &data.nodes {
            let ext_id = parse_ext_id(id_str)?;
            let pos = GeoPoint::new(record.y, record.x);
            let node = if record.is_charging_station {
                let name = record.station_name.as_deref().unwrap_or("Unknown Station");
                builder.add_station_node(ext_id, pos, name)
            } else {
                builder.add_node(ext_id, pos)
            };
            if let Some(count) = record.street_count {
                builder.set_street_count(node, count);
            }
        }

        for record in &data.edges {
            let source_id = parse_ext_id(&record.source)?;
            let target_id = parse_ext_id(&record.target)?;
            let (Some(from), Some(to)) =
                (builder.node_by_ext(source_id), builder.node_by_ext(target_id))
            else {
                return Err(GraphError::MissingEndpoint { source_id, target_id });
            };

            if let Some(len) = record.length {
                if !len.is_finite() || len < 0.0 {
                    return Err(GraphError::Parse(format!(
                        "edge {source_id}->{target_id} has invalid length {len}"
                    )));
                }
            }

            let class = record.highway.as_deref().map_or(HighwayClass::Other, HighwayClass::from_tag);
            let travel_time_s = match record.travel_time {
                Some(t) if t.is_finite() && t > 0.0 => t,
                Some(t) => {
                    return Err(GraphError::Parse(format!(
                        "edge {source_id}->{target_id} has invalid travel_time {t}"
                    )));
                }
                None => synthesize_travel_time(record.length.unwrap_or(f64::NAN), class),
            };

            builder.add_edge(
                from,
                to,
                EdgeSpec {
                    key: Some(record.key),
                    length_m: record.length,
                    travel_time_s: Some(travel_time_s),
                    class,
                    oneway: record.oneway.unwrap_or(false),
                    reversed: record.reversed.unwrap_or(false),
                },
            );
        }

        let graph = builder.build();
        log::info!(
            "loaded road graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Export the graph back into the dataset layout.
    ///
    /// Re-ingesting the exported document yields an equivalent graph (same
    /// node set, edge multiset, and modeled attributes).
    pub fn to_data(&self) -> RoadGraphData {
        let mut nodes = BTreeMap::new();
        for i in 0..self.node_count() {
            let node = ev_core::NodeId(i as u32);
            let pos = self.pos(node);
            nodes.insert(
                self.ext_id(node).to_string(),
                NodeRecord {
                    y: pos.lat,
                    x: pos.lon,
                    street_count: Some(self.node_street_count[i]),
                    is_charging_station: self.is_charging_station(node),
                    station_name: self.station_name(node).map(str::to_string),
                },
            );
        }

        let edges = (0..self.edge_count())
            .map(|e| EdgeRecord {
                source: self.ext_id(self.edge_from[e]).to_string(),
                target: self.ext_id(self.edge_to[e]).to_string(),
                key: self.edge_key[e],
                length: self.edge_length_m[e].is_finite().then_some(self.edge_length_m[e]),
                travel_time: self.edge_travel_s[e].is_finite().then_some(self.edge_travel_s[e]),
                highway: Some(self.edge_class[e].tag().to_string()),
                oneway: Some(self.edge_oneway[e]),
                reversed: Some(self.edge_reversed[e]),
            })
            .collect();

        RoadGraphData {
            directed: true,
            multigraph: true,
            graph: serde_json::Map::new(),
            nodes,
            edges,
        }
    }
}

/// Load a road graph dataset from disk.
pub fn load_road_graph(path: &Path) -> GraphResult<RoadGraph> {
    let reader = BufReader::new(File::open(path)?);
    let data: RoadGraphData = serde_json::from_reader(reader)?;
    RoadGraph::from_data(&data)
}
