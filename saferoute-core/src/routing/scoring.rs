//! Edge cost functions used by the router

use serde::{Deserialize, Serialize};

use crate::model::{EdgeAttributes, StreetEdge};

/// Cost of traversing a street edge. Implementations must return a finite,
/// non-negative value; edges with any other cost are never traversed.
pub trait EdgeCost {
    fn cost(&self, edge: &StreetEdge) -> f64;
}

/// Physical length of the edge in meters
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthCost;

impl EdgeCost for LengthCost {
    fn cost(&self, edge: &StreetEdge) -> f64 {
        edge.length_meters
    }
}

/// Tag values counted as safety conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyScorerConfig {
    /// Values of the `lit` tag meaning the street is lit
    pub lit_values: Vec<String>,
    /// Values of the `sidewalk` tag meaning a sidewalk is present
    pub sidewalk_values: Vec<String>,
    /// `highway` types considered pedestrian friendly
    pub safe_highway_types: Vec<String>,
}

impl Default for SafetyScorerConfig {
    fn default() -> Self {
        Self {
            lit_values: vec!["yes".into()],
            sidewalk_values: vec!["yes".into(), "both".into()],
            safe_highway_types: vec![
                "residential".into(),
                "living_street".into(),
                "pedestrian".into(),
                "footway".into(),
            ],
        }
    }
}

/// Inverse-safety weight of a street edge.
///
/// Counts the satisfied conditions (lit, has sidewalk, safe highway type) and
/// returns `1 / (count + 1)`, so the weight lies in `(0, 1]` and safer edges
/// are cheaper to traverse.
#[derive(Debug, Clone, Default)]
pub struct SafetyScorer {
    config: SafetyScorerConfig,
}

impl SafetyScorer {
    pub fn new(config: SafetyScorerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SafetyScorerConfig {
        &self.config
    }

    pub fn satisfied_conditions(&self, attributes: &EdgeAttributes) -> u32 {
        let matches = |key: &str, accepted: &[String]| {
            attributes
                .get(key)
                .is_some_and(|value| accepted.iter().any(|a| a == value))
        };

        u32::from(matches("lit", &self.config.lit_values))
            + u32::from(matches("sidewalk", &self.config.sidewalk_values))
            + u32::from(matches("highway", &self.config.safe_highway_types))
    }

    pub fn score(&self, attributes: &EdgeAttributes) -> f64 {
        let count = self.satisfied_conditions(attributes);
        log::trace!("Edge satisfies {count} safety conditions");
        1.0 / f64::from(count + 1)
    }
}

impl EdgeCost for SafetyScorer {
    fn cost(&self, edge: &StreetEdge) -> f64 {
        self.score(&edge.attributes)
    }
}

/// Safety weight of an edge under the default conditions
pub fn score(attributes: &EdgeAttributes) -> f64 {
    SafetyScorer::default().score(attributes)
}
