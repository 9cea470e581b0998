//! Street network components - nodes, edges and their tags

use geo::Point;
use hashbrown::HashMap;

use crate::{Meters, StreetNodeId};

/// Street graph node
#[derive(Debug, Clone)]
pub struct StreetNode {
    /// OSM ID of the node
    pub id: StreetNodeId,
    /// Node coordinates (lon, lat)
    pub geometry: Point<f64>,
}

/// Street graph edge (street segment)
#[derive(Debug, Clone)]
pub struct StreetEdge {
    /// Segment length in meters
    pub length_meters: Meters,
    /// Free-form OSM tags of the segment
    pub attributes: EdgeAttributes,
}

impl StreetEdge {
    pub fn new(length_meters: Meters, attributes: EdgeAttributes) -> Self {
        Self {
            length_meters,
            attributes,
        }
    }
}

/// Tags of a street segment (`lit`, `sidewalk`, `highway`, ...).
///
/// Keys are unique; values are kept as the raw strings found in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeAttributes {
    tags: HashMap<String, String>,
}

impl EdgeAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion, mostly useful when assembling graphs by hand
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EdgeAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            tags: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
