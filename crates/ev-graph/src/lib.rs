//! `ev-graph` — road network, charging stations, and spatial indexing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`graph`]    | `RoadGraph` (CSR + R-tree), `RoadGraphBuilder`, `EdgeSpec` |
//! | [`class`]    | `HighwayClass`, class-speed table, travel-time synthesis   |
//! | [`ingest`]   | JSON dataset model, `load_road_graph`, graph export        |
//! | [`stations`] | `ChargingStation`, `StationCatalog`                        |
//! | [`index`]    | `StationIndex` (per-node nearest-station distances)        |
//! | [`error`]    | `GraphError`, `GraphResult<T>`                             |
//!
//! The graph and both station structures are loaded once and read-only at
//! query time; planners share them freely across threads.

pub mod class;
pub mod error;
pub mod graph;
pub mod index;
pub mod ingest;
pub mod stations;


pub use class::{HighwayClass, synthesize_travel_time};
pub use error::{GraphError, GraphResult};
pub use graph::{EdgeSpec, RoadGraph, RoadGraphBuilder};
pub use index::{NearestStation, StationIndex, StationIndexData};
pub use ingest::{RoadGraphData, load_road_graph};
pub use stations::{ChargingStation, StationCatalog, StationLocation};
