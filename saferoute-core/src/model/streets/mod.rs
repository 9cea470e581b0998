//! Pedestrian and street network model

pub mod components;
pub mod network;

pub use components::{EdgeAttributes, StreetEdge, StreetNode};
pub use network::{IndexedPoint, StreetGraph};

pub use petgraph::graph::NodeIndex;
