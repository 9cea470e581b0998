use geo::{Distance, Geodesic, Point};
use hashbrown::HashMap;
use petgraph::{
    Directed,
    graph::{DiGraph, EdgeIndex, Edges, NodeIndex},
};
use rstar::{RTree, primitives::GeomWithData};

use super::components::{StreetEdge, StreetNode};
use crate::{Meters, StreetNodeId, error::RoutingError};

/// Street node position stored in the spatial index
pub type IndexedPoint = GeomWithData<Point<f64>, NodeIndex>;

/// Read-only pedestrian network used for routing.
///
/// Wraps a directed `petgraph` graph together with a lookup from OSM node ids
/// to graph indices and an R-tree over node positions for endpoint snapping.
/// Two-way streets are stored as two opposite edges.
#[derive(Debug, Clone)]
pub struct StreetGraph {
    pub(crate) graph: DiGraph<StreetNode, StreetEdge>,
    node_lookup: HashMap<StreetNodeId, NodeIndex>,
    rtree: RTree<IndexedPoint>,
}

impl StreetGraph {
    pub(crate) fn from_graph(graph: DiGraph<StreetNode, StreetEdge>) -> Self {
        let node_lookup = graph
            .node_indices()
            .map(|idx| (graph[idx].id, idx))
            .collect();

        let points = graph
            .node_indices()
            .map(|idx| IndexedPoint::new(graph[idx].geometry, idx))
            .collect();

        Self {
            graph,
            node_lookup,
            rtree: RTree::bulk_load(points),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn graph(&self) -> &DiGraph<StreetNode, StreetEdge> {
        &self.graph
    }

    /// Resolves an OSM node id to its graph index
    pub fn node_index(&self, id: StreetNodeId) -> Result<NodeIndex, RoutingError> {
        self.node_lookup
            .get(&id)
            .copied()
            .ok_or(RoutingError::NodeNotFound(id))
    }

    pub fn node(&self, index: NodeIndex) -> Option<&StreetNode> {
        self.graph.node_weight(index)
    }

    pub fn edge(&self, index: EdgeIndex) -> Option<&StreetEdge> {
        self.graph.edge_weight(index)
    }

    /// Outgoing edges of a node
    pub fn edges(&self, node: NodeIndex) -> Edges<'_, StreetEdge, Directed> {
        self.graph.edges(node)
    }

    /// Nearest street node to `point` by geodesic distance in meters.
    ///
    /// The R-tree orders candidates by planar distance in degrees, which
    /// stretches east-west offsets away from the equator. Candidates are
    /// re-ranked geodesically until the planar distance alone rules out
    /// anything closer than the best match so far.
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(NodeIndex, Meters)> {
        let mut best: Option<(NodeIndex, Meters)> = None;
        for (candidate, distance_2) in self.rtree.nearest_neighbor_iter_with_distance_2(point) {
            if let Some((_, best_distance)) = best
                && geodesic_lower_bound(point, distance_2.sqrt()) > best_distance
            {
                break;
            }
            let distance = Geodesic.distance(*point, *candidate.geom());
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((candidate.data, distance));
            }
        }
        best
    }

    /// Snaps a coordinate to the street network, failing when the nearest
    /// node lies further than `max_distance` meters away
    pub fn snap(&self, point: &Point<f64>, max_distance: Meters) -> Result<NodeIndex, RoutingError> {
        match self.nearest_node(point) {
            Some((node, distance)) if distance <= max_distance => Ok(node),
            Some((_, distance)) => {
                log::debug!(
                    "Nearest street node to ({:.6}, {:.6}) is {distance:.1} m away",
                    point.x(),
                    point.y()
                );
                Err(RoutingError::NoSnapCandidate {
                    lon: point.x(),
                    lat: point.y(),
                    max_distance,
                })
            }
            None => Err(RoutingError::NoSnapCandidate {
                lon: point.x(),
                lat: point.y(),
                max_distance,
            }),
        }
    }
}

/// Shortest meridian degree on the ellipsoid, slightly rounded down
const MIN_METERS_PER_DEGREE: Meters = 110_500.0;

/// Smallest geodesic distance from `point` to any location `planar` degrees
/// away in the lon/lat plane
fn geodesic_lower_bound(point: &Point<f64>, planar: f64) -> Meters {
    let latitude = (point.y().abs() + planar).min(90.0);
    planar * MIN_METERS_PER_DEGREE * latitude.to_radians().cos()
}
