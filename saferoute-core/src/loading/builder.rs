use geo::Point;
use hashbrown::HashMap;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::{
    Error, Meters, StreetNodeId,
    model::{EdgeAttributes, StreetEdge, StreetGraph, StreetNode},
};

/// Incremental construction of a [`StreetGraph`] with input validation
#[derive(Debug, Default)]
pub struct StreetGraphBuilder {
    graph: DiGraph<StreetNode, StreetEdge>,
    lookup: HashMap<StreetNodeId, NodeIndex>,
}

impl StreetGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            lookup: HashMap::with_capacity(nodes),
        }
    }

    /// Adds a node at (lon, lat).
    ///
    /// # Errors
    ///
    /// Fails on duplicate ids and on coordinates outside the WGS84 range.
    pub fn add_node(&mut self, id: StreetNodeId, lon: f64, lat: f64) -> Result<NodeIndex, Error> {
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidData(format!(
                "Node {id} has invalid coordinates ({lon}, {lat})"
            )));
        }
        if self.lookup.contains_key(&id) {
            return Err(Error::InvalidData(format!("Duplicate node id {id}")));
        }

        let index = self.graph.add_node(StreetNode {
            id,
            geometry: Point::new(lon, lat),
        });
        self.lookup.insert(id, index);
        Ok(index)
    }

    /// Adds a one-directional edge. Parallel edges are kept.
    ///
    /// # Errors
    ///
    /// Fails when an endpoint is unknown or the length is negative or not finite.
    pub fn add_edge(
        &mut self,
        from: StreetNodeId,
        to: StreetNodeId,
        length_meters: Meters,
        attributes: EdgeAttributes,
    ) -> Result<(), Error> {
        if !length_meters.is_finite() || length_meters < 0.0 {
            return Err(Error::InvalidData(format!(
                "Edge {from} -> {to} has invalid length {length_meters}"
            )));
        }
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;

        self.graph
            .add_edge(source, target, StreetEdge::new(length_meters, attributes));
        Ok(())
    }

    /// Adds a street walkable in both directions
    ///
    /// # Errors
    ///
    /// Same as [`StreetGraphBuilder::add_edge`].
    pub fn add_street(
        &mut self,
        a: StreetNodeId,
        b: StreetNodeId,
        length_meters: Meters,
        attributes: EdgeAttributes,
    ) -> Result<(), Error> {
        self.add_edge(a, b, length_meters, attributes.clone())?;
        self.add_edge(b, a, length_meters, attributes)
    }

    pub fn build(self) -> StreetGraph {
        log::info!(
            "Street graph built with {} nodes and {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        );
        StreetGraph::from_graph(self.graph)
    }

    fn resolve(&self, id: StreetNodeId) -> Result<NodeIndex, Error> {
        self.lookup
            .get(&id)
            .copied()
            .ok_or_else(|| Error::InvalidData(format!("Edge references unknown node {id}")))
    }
}
