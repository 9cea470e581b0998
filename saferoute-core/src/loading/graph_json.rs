//! JSON exchange format of the street graph provider:
//!
//! ```json
//! {
//!   "directed": false,
//!   "nodes": [{"id": 1, "lon": 34.77, "lat": 32.08}],
//!   "edges": [{"from": 1, "to": 2, "length": 12.5, "tags": {"lit": "yes"}}]
//! }
//! ```

use std::io::Read;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::builder::StreetGraphBuilder;
use crate::{
    Error, Meters, StreetNodeId,
    model::{EdgeAttributes, StreetGraph},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Undirected graphs get every edge in both directions
    #[serde(default)]
    pub directed: bool,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: StreetNodeId,
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: StreetNodeId,
    pub to: StreetNodeId,
    #[serde(alias = "length_meters")]
    pub length: Meters,
    #[serde(default)]
    pub tags: HashMap<String, JsonValue>,
}

impl EdgeRecord {
    /// Normalises raw tag values into strings.
    ///
    /// Booleans become `yes`/`no`, numbers their decimal form; lists (left by
    /// merging simplified ways) contribute their first element. Nulls are
    /// dropped.
    pub fn attributes(&self) -> EdgeAttributes {
        self.tags
            .iter()
            .filter_map(|(key, value)| tag_value(value).map(|v| (key.clone(), v)))
            .collect()
    }
}

fn tag_value(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Bool(true) => Some("yes".to_string()),
        JsonValue::Bool(false) => Some("no".to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Array(items) => items.first().and_then(tag_value),
        JsonValue::Null | JsonValue::Object(_) => None,
    }
}

impl GraphRecord {
    /// # Errors
    ///
    /// Fails on invalid nodes or edges, see [`StreetGraphBuilder`].
    pub fn into_graph(self) -> Result<StreetGraph, Error> {
        let edge_capacity = if self.directed {
            self.edges.len()
        } else {
            self.edges.len() * 2
        };
        let mut builder = StreetGraphBuilder::with_capacity(self.nodes.len(), edge_capacity);

        for node in &self.nodes {
            builder.add_node(node.id, node.lon, node.lat)?;
        }
        for edge in &self.edges {
            let attributes = edge.attributes();
            if self.directed {
                builder.add_edge(edge.from, edge.to, edge.length, attributes)?;
            } else {
                builder.add_street(edge.from, edge.to, edge.length, attributes)?;
            }
        }

        Ok(builder.build())
    }
}

impl StreetGraph {
    /// Reads a graph in the provider's JSON format
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or invalid graph data.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let record: GraphRecord = serde_json::from_reader(reader)?;
        record.into_graph()
    }

    /// # Errors
    ///
    /// Returns an error on malformed JSON or invalid graph data.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let record: GraphRecord = serde_json::from_str(json)?;
        record.into_graph()
    }
}
