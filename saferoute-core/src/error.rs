use thiserror::Error;

use crate::StreetNodeId;
use crate::routing::RouteVariant;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error(transparent)]
    Routing(#[from] RoutingError),
}

/// Failures of a single routing request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("Node {0} is not part of the street graph")]
    NodeNotFound(StreetNodeId),
    #[error("No street node within {max_distance:.0} m of ({lon:.6}, {lat:.6})")]
    NoSnapCandidate {
        lon: f64,
        lat: f64,
        max_distance: f64,
    },
    #[error("No {variant} path exists between nodes {from} and {to}")]
    NoPathExists {
        from: StreetNodeId,
        to: StreetNodeId,
        variant: RouteVariant,
    },
}
