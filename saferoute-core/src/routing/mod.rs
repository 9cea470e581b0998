//! Routing over the street network: a length-shortest path and a
//! safety-weighted alternative computed on the same graph snapshot.

pub mod dijkstra;
pub mod dual_path;
pub mod scoring;
mod to_geojson;

pub use dual_path::{DualPathRouter, Route, RoutePair, RouteVariant, route};
pub use scoring::{EdgeCost, LengthCost, SafetyScorer, SafetyScorerConfig};
