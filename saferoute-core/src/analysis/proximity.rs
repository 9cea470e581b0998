use geo::{Distance, Euclidean, Intersects};
use hashbrown::HashMap;
use rayon::prelude::*;

use super::{
    config::{AnalysisConfig, ProximityRadii},
    lighting::{EndpointLightingClassifier, LightingClassifier, split_lighting},
    metrics::{HazardFlags, LightingSplit, Metric, MetricsAggregator, SafetyMetrics},
    projected::{ProjectedFeatures, ProjectedRoute},
};
use crate::{
    Meters,
    model::{FeatureCategory, FeatureSet},
    projection::Reprojector,
    routing::Route,
};

/// Feature data available for one route, per category
#[derive(Debug, Clone, Default)]
pub struct CategoryFeatures {
    sets: HashMap<FeatureCategory, Metric<FeatureSet>>,
}

impl CategoryFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, set: FeatureSet) {
        self.sets.insert(set.category, Metric::Available(set));
    }

    pub fn mark_unavailable(&mut self, category: FeatureCategory, reason: impl Into<String>) {
        self.sets.insert(category, Metric::unavailable(reason));
    }

    /// Categories never inserted are reported as unavailable
    pub fn get(&self, category: FeatureCategory) -> Metric<&FeatureSet> {
        self.sets.get(&category).map_or_else(
            || Metric::unavailable(format!("{category} features were not queried")),
            Metric::as_ref,
        )
    }
}

impl FromIterator<FeatureSet> for CategoryFeatures {
    fn from_iter<I: IntoIterator<Item = FeatureSet>>(iter: I) -> Self {
        let mut features = Self::new();
        for set in iter {
            features.insert(set);
        }
        features
    }
}

/// Proximity tests between a route and safety features, all run in the
/// metric CRS
#[derive(Debug, Clone)]
pub struct ProximityAnalyzer {
    reprojector: Reprojector,
    radii: ProximityRadii,
    aggregator: MetricsAggregator,
}

impl ProximityAnalyzer {
    pub fn new(reprojector: Reprojector, radii: ProximityRadii, aggregator: MetricsAggregator) -> Self {
        Self {
            reprojector,
            radii,
            aggregator,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            Reprojector::new(config.metric_crs),
            config.radii,
            MetricsAggregator::new(config.reconciliation_tolerance_km),
        )
    }

    pub fn reprojector(&self) -> &Reprojector {
        &self.reprojector
    }

    pub fn project_route(&self, route: &Route) -> ProjectedRoute {
        ProjectedRoute::new(&self.reprojector, route.geometry())
    }

    pub fn project_features(&self, features: &FeatureSet) -> ProjectedFeatures {
        ProjectedFeatures::new(&self.reprojector, features)
    }

    /// Lit/dark split using the endpoint heuristic and the light radius
    pub fn lighting(&self, route: &ProjectedRoute, lights: &ProjectedFeatures) -> LightingSplit {
        let classifier = EndpointLightingClassifier::new(lights, self.radii.light);
        self.lighting_with(route, &classifier)
    }

    pub fn lighting_with(
        &self,
        route: &ProjectedRoute,
        classifier: &dyn LightingClassifier,
    ) -> LightingSplit {
        split_lighting(route, classifier)
    }

    /// Number of features strictly inside the route buffer of `radius` meters
    pub fn count_within_buffer(
        &self,
        route: &ProjectedRoute,
        features: &ProjectedFeatures,
        radius: Meters,
    ) -> usize {
        features
            .geometries()
            .iter()
            .filter(|geometry| Euclidean.distance(*geometry, route.line()) < radius)
            .count()
    }

    pub fn any_within_buffer(
        &self,
        route: &ProjectedRoute,
        features: &ProjectedFeatures,
        radius: Meters,
    ) -> bool {
        features
            .geometries()
            .iter()
            .any(|geometry| Euclidean.distance(geometry, route.line()) < radius)
    }

    /// True when a feature touches the unbuffered route line
    pub fn intersects_route(&self, route: &ProjectedRoute, features: &ProjectedFeatures) -> bool {
        features
            .geometries()
            .iter()
            .any(|geometry| route.line().intersects(geometry))
    }

    /// Computes all metrics of a route from the per-category feature data.
    /// A failed category only makes its own metric unavailable.
    pub fn analyze(&self, route: &Route, features: &CategoryFeatures) -> SafetyMetrics {
        let projected = self.project_route(route);
        let project = |category| features.get(category).map(|set| self.project_features(set));

        let lighting = project(FeatureCategory::Light).map(|lights| self.lighting(&projected, &lights));
        let shelter_count = project(FeatureCategory::Shelter)
            .map(|shelters| self.count_within_buffer(&projected, &shelters, self.radii.shelter));

        let near = |category: FeatureCategory| {
            let radius = self.radii.radius(category).unwrap_or_default();
            project(category).map(|hazards| self.any_within_buffer(&projected, &hazards, radius))
        };
        let hazards = HazardFlags {
            near_construction: near(FeatureCategory::Construction),
            near_night_work: near(FeatureCategory::NightWork),
            near_road_work: near(FeatureCategory::RoadWork),
            on_walking_street: project(FeatureCategory::WalkingStreet)
                .map(|streets| self.intersects_route(&projected, &streets)),
        };

        self.aggregator
            .aggregate(route, lighting, shelter_count, hazards)
    }

    /// Analyzes several routes in parallel
    pub fn analyze_all(&self, inputs: &[(&Route, &CategoryFeatures)]) -> Vec<SafetyMetrics> {
        inputs
            .par_iter()
            .map(|(route, features)| self.analyze(route, features))
            .collect()
    }
}

impl Default for ProximityAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}
