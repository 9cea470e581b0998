use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_PROXIMITY_RADIUS, DEFAULT_RECONCILIATION_TOLERANCE_KM, Meters,
    model::FeatureCategory, projection::MetricCrs, routing::SafetyScorerConfig,
};

/// Proximity radius per feature category, in meters.
///
/// Walking streets have no radius: they are tested by intersection with the
/// route line itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityRadii {
    pub light: Meters,
    pub shelter: Meters,
    pub construction: Meters,
    pub night_work: Meters,
    pub road_work: Meters,
}

impl Default for ProximityRadii {
    fn default() -> Self {
        Self {
            light: DEFAULT_PROXIMITY_RADIUS,
            shelter: DEFAULT_PROXIMITY_RADIUS,
            construction: DEFAULT_PROXIMITY_RADIUS,
            night_work: DEFAULT_PROXIMITY_RADIUS,
            road_work: DEFAULT_PROXIMITY_RADIUS,
        }
    }
}

impl ProximityRadii {
    pub fn radius(&self, category: FeatureCategory) -> Option<Meters> {
        match category {
            FeatureCategory::Light => Some(self.light),
            FeatureCategory::Shelter => Some(self.shelter),
            FeatureCategory::Construction => Some(self.construction),
            FeatureCategory::NightWork => Some(self.night_work),
            FeatureCategory::RoadWork => Some(self.road_work),
            FeatureCategory::WalkingStreet => None,
        }
    }
}

/// Settings of the routing and proximity analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub metric_crs: MetricCrs,
    pub radii: ProximityRadii,
    /// Allowed difference between lit + dark distance and route length, km
    pub reconciliation_tolerance_km: f64,
    /// Maximum distance between a requested endpoint and its street node, m
    pub max_snap_distance: Meters,
    pub scorer: SafetyScorerConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            metric_crs: MetricCrs::default(),
            radii: ProximityRadii::default(),
            reconciliation_tolerance_km: DEFAULT_RECONCILIATION_TOLERANCE_KM,
            max_snap_distance: 500.0,
            scorer: SafetyScorerConfig::default(),
        }
    }
}
