use geojson::FeatureCollection;
use saferoute_core::analysis::metrics::serialize_km;
use saferoute_core::analysis::{Metric, SafetyMetrics};
use saferoute_core::error::RoutingError;
use saferoute_core::routing::{Route, RouteVariant};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

use crate::error::Error;
use crate::narrative::NarrativeResult;

/// Everything the caller gets back about one route
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    pub route_index: usize,
    pub variant: RouteVariant,
    #[serde(serialize_with = "serialize_km")]
    pub distance_km: f64,
    /// `[lon, lat]` pairs
    pub coordinates: Vec<[f64; 2]>,
    pub metrics: SafetyMetrics,
    /// Absent when narrative scoring is disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<Metric<NarrativeResult>>,
    #[serde(skip)]
    route: Route,
}

impl RouteReport {
    pub fn new(
        route: Route,
        metrics: SafetyMetrics,
        narrative: Option<Metric<NarrativeResult>>,
    ) -> Self {
        Self {
            route_index: route.route_index(),
            variant: route.variant(),
            distance_km: route.distance_km(),
            coordinates: route.coordinates().into_iter().map(|(x, y)| [x, y]).collect(),
            metrics,
            narrative,
            route,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn to_feature(&self) -> Result<geojson::Feature, Error> {
        let mut properties = match serde_json::to_value(&self.metrics)? {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        };
        if let Some(narrative) = &self.narrative {
            properties.insert("narrative".into(), serde_json::to_value(narrative)?);
        }
        Ok(self.route.to_feature(Some(properties))?)
    }
}

/// A route variant the router could not produce
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteFailure {
    pub route_index: usize,
    pub variant: RouteVariant,
    #[serde(serialize_with = "serialize_display")]
    pub error: RoutingError,
}

/// Result of one request: a report per found route, a failure per missing one
#[derive(Debug, Clone, Serialize)]
pub struct RouteAnalysis {
    pub routes: Vec<RouteReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<RouteFailure>,
    /// The caller cancelled while the request was running
    pub cancelled: bool,
}

impl RouteAnalysis {
    pub fn route(&self, variant: RouteVariant) -> Option<&RouteReport> {
        self.routes.iter().find(|report| report.variant == variant)
    }

    /// One LineString feature per route with its metrics as properties
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let features = self
            .routes
            .iter()
            .map(RouteReport::to_feature)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }
}

fn serialize_display<S: Serializer>(
    value: &impl std::fmt::Display,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
