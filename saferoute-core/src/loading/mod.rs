//! This module is responsible for assembling the street graph handed over by
//! the graph provider, either node by node or from its JSON export.

mod builder;
mod graph_json;

pub use builder::StreetGraphBuilder;
pub use graph_json::{EdgeRecord, GraphRecord, NodeRecord};
