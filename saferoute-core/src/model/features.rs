//! Municipal and OSM features analysed around a route

use std::fmt;

use geo::{BoundingRect, Geometry, Rect};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Category of a safety-relevant feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    Light,
    Shelter,
    Construction,
    NightWork,
    RoadWork,
    WalkingStreet,
}

impl FeatureCategory {
    pub const ALL: [FeatureCategory; 6] = [
        FeatureCategory::Light,
        FeatureCategory::Shelter,
        FeatureCategory::Construction,
        FeatureCategory::NightWork,
        FeatureCategory::RoadWork,
        FeatureCategory::WalkingStreet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureCategory::Light => "light",
            FeatureCategory::Shelter => "shelter",
            FeatureCategory::Construction => "construction",
            FeatureCategory::NightWork => "night_work",
            FeatureCategory::RoadWork => "road_work",
            FeatureCategory::WalkingStreet => "walking_street",
        }
    }

    /// Hazard categories are reported as "near" flags
    pub fn is_hazard(self) -> bool {
        matches!(
            self,
            FeatureCategory::Construction | FeatureCategory::NightWork | FeatureCategory::RoadWork
        )
    }
}

impl fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point, line or polygon feature in geographic coordinates (lon, lat)
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    /// Opaque attributes as delivered by the source
    pub attributes: Map<String, JsonValue>,
}

impl Feature {
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: geometry.into(),
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Map<String, JsonValue>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// All features of one category returned for a query
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub category: FeatureCategory,
    pub features: Vec<Feature>,
}

impl FeatureSet {
    pub fn new(category: FeatureCategory, features: Vec<Feature>) -> Self {
        Self { category, features }
    }

    pub fn empty(category: FeatureCategory) -> Self {
        Self::new(category, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Keeps only the features whose bounding box touches `envelope`
    #[must_use]
    pub fn within_envelope(&self, envelope: &Rect<f64>) -> Self {
        let features = self
            .features
            .iter()
            .filter(|feature| {
                feature
                    .geometry
                    .bounding_rect()
                    .is_some_and(|rect| rects_touch(&rect, envelope))
            })
            .cloned()
            .collect();
        Self::new(self.category, features)
    }
}

fn rects_touch(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x && b.min().x <= a.max().x && a.min().y <= b.max().y && b.min().y <= a.max().y
}
