mod state;
pub mod traced_dijkstra;

pub use traced_dijkstra::{PathTrace, canonical_edge, dijkstra_path};
