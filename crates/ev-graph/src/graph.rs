//! Road graph representation and builder.
//!
//! # Data layout
//!
//! The graph is a directed multigraph in **Compressed Sparse Row (CSR)**
//! format.  Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays are sorted by `(source, target, key)` and indexed by
//! `EdgeId`, so iterating a node's out-edges is a contiguous memory scan and
//! the lowest-keyed parallel edge between two nodes is found first.
//!
//! Nodes keep the stable integer id they carry in the serialized dataset
//! (`node_ext_id`); paths cross the API boundary in those external ids.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used
//! to snap geocoded endpoints and charging-station coordinates to the road
//! network.

use std::collections::VecDeque;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use ev_core::{EdgeId, GeoPoint, NodeId};

use crate::class::{HighwayClass, synthesize_travel_time};
use crate::stations::ChargingStation;

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone, Debug)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node queries at road-network density (error < 0.1 % at
    /// ≤ 60° lat).
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed road multigraph in CSR format plus a spatial index for snapping.
///
/// All arrays are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadGraphBuilder`].
#[derive(Debug)]
pub struct RoadGraph {
    // ── Node data (indexed by NodeId) ─────────────────────────────────────
    /// Geographic position of each node.
    pub node_pos: Vec<GeoPoint>,

    /// Stable dataset id of each node.
    pub node_ext_id: Vec<i64>,

    /// `street_count` dataset attribute (0 when absent).
    pub node_street_count: Vec<u32>,

    /// Whether the node is a charging station.
    pub node_charging: Vec<bool>,

    /// Station display names, present only for charging-station nodes.
    station_names: FxHashMap<NodeId, String>,

    /// Dataset id → dense id.
    ext_index: FxHashMap<i64, NodeId>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.  Length = node_count + 1.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,

    /// Multigraph key disambiguating parallel edges.
    pub edge_key: Vec<u32>,

    /// Length in metres; `NAN` when the dataset carried none.
    pub edge_length_m: Vec<f64>,

    /// Travel time in seconds; `NAN` when neither the dataset nor ingest
    /// provided one (builder-made graphs).  Read through
    /// [`RoadGraph::travel_time_s`].
    pub edge_travel_s: Vec<f64>,

    pub edge_class: Vec<HighwayClass>,
    pub edge_oneway: Vec<bool>,
    pub edge_reversed: Vec<bool>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl RoadGraph {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Node accessors ────────────────────────────────────────────────────

    #[inline]
    pub fn pos(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    /// Stable dataset id of `node`.
    #[inline]
    pub fn ext_id(&self, node: NodeId) -> i64 {
        self.node_ext_id[node.index()]
    }

    /// Dense id for a dataset id, if the node exists.
    pub fn node_by_ext(&self, ext_id: i64) -> Option<NodeId> {
        self.ext_index.get(&ext_id).copied()
    }

    #[inline]
    pub fn is_charging_station(&self, node: NodeId) -> bool {
        self.node_charging[node.index()]
    }

    pub fn station_name(&self, node: NodeId) -> Option<&str> {
        self.station_names.get(&node).map(String::as_str)
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// This is a contiguous index range — no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node` (number of outgoing edges, counting parallels).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// The lowest-keyed edge from `u` to `v`, if any.
    ///
    /// Edges are sorted by `(source, target, key)`, so the first match is
    /// the lowest key.
    pub fn edge_between(&self, u: NodeId, v: NodeId) -> Option<EdgeId> {
        self.out_edges(u).find(|&e| self.edge_to[e.index()] == v)
    }

    /// Travel time of `edge` in seconds, synthesizing from length and class
    /// speed when the stored value is absent.
    #[inline]
    pub fn travel_time_s(&self, edge: EdgeId) -> f64 {
        let t = self.edge_travel_s[edge.index()];
        if t.is_finite() {
            t
        } else {
            synthesize_travel_time(self.edge_length_m[edge.index()], self.edge_class[edge.index()])
        }
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest road node to `pos` and its haversine distance in metres.
    ///
    /// Returns `None` only if the graph has no nodes.
    pub fn nearest_node(&self, pos: GeoPoint) -> Option<(NodeId, f64)> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| (e.id, self.pos(e.id).distance_m(pos)))
    }

    /// Nearest node to `pos` among `candidates` (linear haversine scan).
    ///
    /// Used to re-snap endpoints into a specific component.
    pub fn nearest_node_in(&self, pos: GeoPoint, candidates: &[NodeId]) -> Option<(NodeId, f64)> {
        candidates
            .iter()
            .map(|&n| (n, self.pos(n).distance_m(pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    // ── Connectivity ──────────────────────────────────────────────────────

    /// `true` if a directed path from `from` to `to` exists (BFS, objectives
    /// ignored).
    pub fn is_reachable(&self, from: NodeId, to: NodeId) -> bool {
        if from == to {
            return true;
        }
        let mut seen = vec![false; self.node_count()];
        let mut queue = VecDeque::new();
        seen[from.index()] = true;
        queue.push_back(from);
        while let Some(node) = queue.pop_front() {
            for e in self.out_edges(node) {
                let next = self.edge_to[e.index()];
                if next == to {
                    return true;
                }
                if !seen[next.index()] {
                    seen[next.index()] = true;
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// Weakly-connected components, largest first.
    ///
    /// Edge direction is ignored (union-find over edge endpoints).  Nodes
    /// within a component are in ascending id order.
    pub fn weak_components(&self) -> Vec<Vec<NodeId>> {
        let n = self.node_count();
        let mut parent: Vec<u32> = (0..n as u32).collect();

        fn find(parent: &mut [u32], mut x: u32) -> u32 {
            while parent[x as usize] != x {
                parent[x as usize] = parent[parent[x as usize] as usize]; // path halving
                x = parent[x as usize];
            }
            x
        }

        for i in 0..self.edge_count() {
            let a = find(&mut parent, self.edge_from[i].0);
            let b = find(&mut parent, self.edge_to[i].0);
            if a != b {
                parent[a as usize] = b;
            }
        }

        let mut by_root: FxHashMap<u32, Vec<NodeId>> = FxHashMap::default();
        for i in 0..n as u32 {
            let root = find(&mut parent, i);
            by_root.entry(root).or_default().push(NodeId(i));
        }

        let mut components: Vec<Vec<NodeId>> = by_root.into_values().collect();
        // Largest first; tie-break on smallest member id for determinism.
        components.sort_by_key(|c| (std::cmp::Reverse(c.len()), c[0]));
        components
    }

    /// Nodes of the largest weakly-connected component.
    pub fn largest_component(&self) -> Vec<NodeId> {
        self.weak_components().into_iter().next().unwrap_or_default()
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Per-edge attributes accepted by [`RoadGraphBuilder::add_edge`].
///
/// `key: None` assigns the next free multigraph key for the `(from, to)`
/// pair.  Absent `length_m`/`travel_time_s` are carried as `NAN` and
/// synthesized where consumed.
#[derive(Clone, Debug, Default)]
pub struct EdgeSpec {
    pub key: Option<u32>,
    pub length_m: Option<f64>,
    pub travel_time_s: Option<f64>,
    pub class: HighwayClass,
    pub oneway: bool,
    pub reversed: bool,
}

struct RawNode {
    ext_id: i64,
    pos: GeoPoint,
    street_count: u32,
    charging: bool,
    station_name: Option<String>,
}

struct RawEdge {
    from: NodeId,
    to: NodeId,
    key: u32,
    length_m: f64,
    travel_s: f64,
    class: HighwayClass,
    oneway: bool,
    reversed: bool,
}

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order.  `build()`
/// sorts edges, constructs the CSR arrays, and bulk-loads the R-tree.
pub struct RoadGraphBuilder {
    nodes: Vec<RawNode>,
    raw_edges: Vec<RawEdge>,
    ext_index: FxHashMap<i64, NodeId>,
    next_key: FxHashMap<(u32, u32), u32>,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            raw_edges: Vec::new(),
            ext_index: FxHashMap::default(),
            next_key: FxHashMap::default(),
        }
    }

    /// Pre-allocate for the expected number of nodes and edges to reduce
    /// reallocations when bulk-loading a dataset.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
            ext_index: FxHashMap::default(),
            next_key: FxHashMap::default(),
        }
    }

    /// Add a road node and return its dense `NodeId` (sequential from 0).
    ///
    /// # Panics
    /// Panics if `ext_id` was already added.
    pub fn add_node(&mut self, ext_id: i64, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let prev = self.ext_index.insert(ext_id, id);
        assert!(prev.is_none(), "duplicate node id {ext_id}");
        self.nodes.push(RawNode {
            ext_id,
            pos,
            street_count: 0,
            charging: false,
            station_name: None,
        });
        id
    }

    /// Add a charging-station node.
    pub fn add_station_node(&mut self, ext_id: i64, pos: GeoPoint, name: &str) -> NodeId {
        let id = self.add_node(ext_id, pos);
        let raw = &mut self.nodes[id.index()];
        raw.charging = true;
        raw.station_name = Some(name.to_string());
        id
    }

    pub fn set_street_count(&mut self, node: NodeId, count: u32) {
        self.nodes[node.index()].street_count = count;
    }

    /// Add a **directed** edge from `from` to `to`.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, spec: EdgeSpec) -> EdgeId {
        let key = match spec.key {
            Some(k) => k,
            None => {
                let slot = self.next_key.entry((from.0, to.0)).or_insert(0);
                let k = *slot;
                *slot += 1;
                k
            }
        };
        let id = EdgeId(self.raw_edges.len() as u32);
        self.raw_edges.push(RawEdge {
            from,
            to,
            key,
            length_m: spec.length_m.unwrap_or(f64::NAN),
            travel_s: spec.travel_time_s.unwrap_or(f64::NAN),
            class: spec.class,
            oneway: spec.oneway,
            reversed: spec.reversed,
        });
        id
    }

    /// Convenience: add edges in **both directions** for an undirected road
    /// segment.  The return direction is marked `reversed`.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, spec: EdgeSpec) {
        self.add_edge(a, b, EdgeSpec { reversed: false, ..spec.clone() });
        self.add_edge(b, a, EdgeSpec { reversed: true, ..spec });
    }

    /// Add a charging station as a graph node connected to the road network
    /// by a synthetic bidirectional service edge whose length is the
    /// straight-line distance to the nearest non-station node.
    ///
    /// Returns `None` (adding nothing) when the builder holds no road node
    /// to connect to.
    pub fn attach_station(&mut self, station: &ChargingStation) -> Option<NodeId> {
        let pos = station.point();
        let (nearest, dist) = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.charging)
            .map(|(i, n)| (NodeId(i as u32), n.pos.distance_m(pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        let ext_id = self.next_ext_id();
        let node = self.add_station_node(ext_id, pos, &station.name);
        self.add_road(
            node,
            nearest,
            EdgeSpec {
                length_m: Some(dist),
                class: HighwayClass::Service,
                ..EdgeSpec::default()
            },
        );
        Some(node)
    }

    /// Smallest unused dataset id (synthetic nodes go above all real ones).
    fn next_ext_id(&self) -> i64 {
        self.nodes.iter().map(|n| n.ext_id).max().map_or(1_000_000, |m| m + 1)
    }

    /// Look up the position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()].pos
    }

    /// Dense id for a dataset id added earlier.
    pub fn node_by_ext(&self, ext_id: i64) -> Option<NodeId> {
        self.ext_index.get(&ext_id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.raw_edges.len()
    }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Time complexity: O(E log E) for the edge sort + O(N log N) for the
    /// R-tree bulk load.
    pub fn build(self) -> RoadGraph {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Sort by (source, target, key) so CSR rows are contiguous and
        // edge_between finds the lowest-keyed parallel edge first.
        let mut raw = self.raw_edges;
        raw.sort_unstable_by_key(|e| (e.from.0, e.to.0, e.key));

        let edge_from: Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to: Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_key: Vec<u32> = raw.iter().map(|e| e.key).collect();
        let edge_length_m: Vec<f64> = raw.iter().map(|e| e.length_m).collect();
        let edge_travel_s: Vec<f64> = raw.iter().map(|e| e.travel_s).collect();
        let edge_class: Vec<HighwayClass> = raw.iter().map(|e| e.class).collect();
        let edge_oneway: Vec<bool> = raw.iter().map(|e| e.oneway).collect();
        let edge_reversed: Vec<bool> = raw.iter().map(|e| e.reversed).collect();

        // Build CSR row pointer.
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        // Bulk-load R-tree for O(N log N) construction.
        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| NodeEntry {
                point: [n.pos.lat, n.pos.lon],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        let mut station_names = FxHashMap::default();
        for (i, n) in self.nodes.iter().enumerate() {
            if let Some(name) = &n.station_name {
                station_names.insert(NodeId(i as u32), name.clone());
            }
        }

        RoadGraph {
            node_pos: self.nodes.iter().map(|n| n.pos).collect(),
            node_ext_id: self.nodes.iter().map(|n| n.ext_id).collect(),
            node_street_count: self.nodes.iter().map(|n| n.street_count).collect(),
            node_charging: self.nodes.iter().map(|n| n.charging).collect(),
            station_names,
            ext_index: self.ext_index,
            node_out_start,
            edge_from,
            edge_to,
            edge_key,
            edge_length_m,
            edge_travel_s,
            edge_class,
            edge_oneway,
            edge_reversed,
            spatial_idx,
        }
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
