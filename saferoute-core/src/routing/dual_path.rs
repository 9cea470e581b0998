use std::fmt;

use geo::{Coord, LineString, Point};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use super::{
    dijkstra::{PathTrace, dijkstra_path},
    scoring::{EdgeCost, LengthCost, SafetyScorer},
};
use crate::{Meters, StreetNodeId, error::RoutingError, model::StreetGraph};

/// Which of the two searches produced a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteVariant {
    /// Minimum total `length_meters`
    Shortest,
    /// Minimum total safety weight
    Safest,
}

impl RouteVariant {
    /// Position of the variant in caller-facing results
    pub fn route_index(self) -> usize {
        match self {
            RouteVariant::Shortest => 0,
            RouteVariant::Safest => 1,
        }
    }
}

impl fmt::Display for RouteVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteVariant::Shortest => f.write_str("shortest"),
            RouteVariant::Safest => f.write_str("safest"),
        }
    }
}

/// Walking route produced by the router. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    variant: RouteVariant,
    nodes: Vec<StreetNodeId>,
    geometry: LineString<f64>,
    distance_km: f64,
    safety_weight: f64,
}

impl Route {
    fn from_trace(
        graph: &StreetGraph,
        scorer: &SafetyScorer,
        variant: RouteVariant,
        trace: &PathTrace,
    ) -> Self {
        let street_nodes: Vec<_> = trace.nodes.iter().filter_map(|&n| graph.node(n)).collect();

        let mut coords: Vec<Coord<f64>> = street_nodes.iter().map(|n| n.geometry.0).collect();
        // a route always has at least one segment, even when origin == destination
        if coords.len() == 1 {
            coords.push(coords[0]);
        }

        let (length_meters, safety_weight) = trace
            .edges
            .iter()
            .filter_map(|&e| graph.edge(e))
            .fold((0.0, 0.0), |(length, safety), edge| {
                (length + edge.length_meters, safety + scorer.cost(edge))
            });

        Self {
            variant,
            nodes: street_nodes.iter().map(|n| n.id).collect(),
            geometry: LineString::new(coords),
            distance_km: length_meters / 1000.0,
            safety_weight,
        }
    }

    pub fn variant(&self) -> RouteVariant {
        self.variant
    }

    pub fn route_index(&self) -> usize {
        self.variant.route_index()
    }

    /// OSM ids of the traversed nodes, origin first
    pub fn nodes(&self) -> &[StreetNodeId] {
        &self.nodes
    }

    /// Route polyline in (lon, lat)
    pub fn geometry(&self) -> &LineString<f64> {
        &self.geometry
    }

    /// Route coordinates as `(lon, lat)` pairs
    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        self.geometry.coords().map(|c| (c.x, c.y)).collect()
    }

    /// Sum of the traversed edge lengths, in kilometers
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Sum of the safety weights of the traversed edges
    pub fn safety_weight(&self) -> f64 {
        self.safety_weight
    }
}

/// Result of one routing request. The two variants fail independently.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePair {
    pub shortest: Result<Route, RoutingError>,
    pub safest: Result<Route, RoutingError>,
}

impl RoutePair {
    /// Successfully computed routes, shortest first
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        [&self.shortest, &self.safest]
            .into_iter()
            .filter_map(|r| r.as_ref().ok())
    }

    pub fn get(&self, variant: RouteVariant) -> &Result<Route, RoutingError> {
        match variant {
            RouteVariant::Shortest => &self.shortest,
            RouteVariant::Safest => &self.safest,
        }
    }
}

/// Computes the shortest and the safety-weighted route between two nodes
#[derive(Debug, Clone)]
pub struct DualPathRouter<'a> {
    graph: &'a StreetGraph,
    scorer: SafetyScorer,
}

impl<'a> DualPathRouter<'a> {
    pub fn new(graph: &'a StreetGraph, scorer: SafetyScorer) -> Self {
        Self { graph, scorer }
    }

    pub fn graph(&self) -> &StreetGraph {
        self.graph
    }

    /// Routes between two OSM node ids.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if either endpoint is not in the graph. A
    /// missing path is reported per variant inside the [`RoutePair`].
    pub fn route(
        &self,
        origin: StreetNodeId,
        destination: StreetNodeId,
    ) -> Result<RoutePair, RoutingError> {
        let start = self.graph.node_index(origin)?;
        let target = self.graph.node_index(destination)?;
        Ok(self.route_nodes(start, target))
    }

    /// Routes between two coordinates snapped to their nearest street nodes.
    ///
    /// # Errors
    ///
    /// Returns `NoSnapCandidate` when an endpoint lies further than
    /// `max_snap_distance` meters from the network.
    pub fn route_between_points(
        &self,
        origin: &Point<f64>,
        destination: &Point<f64>,
        max_snap_distance: Meters,
    ) -> Result<RoutePair, RoutingError> {
        let start = self.graph.snap(origin, max_snap_distance)?;
        let target = self.graph.snap(destination, max_snap_distance)?;
        Ok(self.route_nodes(start, target))
    }

    /// Routes between two already resolved graph nodes.
    ///
    /// Lets callers mix endpoints given by id with snapped coordinates
    /// without turning a node back into a position.
    pub fn route_nodes(&self, start: NodeIndex, target: NodeIndex) -> RoutePair {
        log::debug!(
            "Routing between graph nodes {} and {}",
            start.index(),
            target.index()
        );
        RoutePair {
            shortest: self.search(start, target, RouteVariant::Shortest, &LengthCost),
            safest: self.search(start, target, RouteVariant::Safest, &self.scorer),
        }
    }

    fn search<C: EdgeCost + ?Sized>(
        &self,
        start: NodeIndex,
        target: NodeIndex,
        variant: RouteVariant,
        cost: &C,
    ) -> Result<Route, RoutingError> {
        let trace = dijkstra_path(self.graph, start, target, cost).ok_or_else(|| {
            let id = |n: NodeIndex| self.graph.node(n).map_or(-1, |node| node.id);
            RoutingError::NoPathExists {
                from: id(start),
                to: id(target),
                variant,
            }
        })?;

        let route = Route::from_trace(self.graph, &self.scorer, variant, &trace);
        log::debug!(
            "{variant} route: {} nodes, {:.3} km, safety weight {:.3}",
            route.nodes.len(),
            route.distance_km,
            route.safety_weight
        );
        Ok(route)
    }
}

/// Shortest and safety-weighted routes with the default safety conditions.
///
/// # Errors
///
/// Returns `NodeNotFound` if either endpoint is not in the graph.
pub fn route(
    graph: &StreetGraph,
    origin: StreetNodeId,
    destination: StreetNodeId,
) -> Result<RoutePair, RoutingError> {
    DualPathRouter::new(graph, SafetyScorer::default()).route(origin, destination)
}
