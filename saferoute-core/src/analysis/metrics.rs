//! Per-route safety metrics and their aggregation

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::routing::Route;

/// A metric whose input data may have failed to load.
///
/// Keeps "zero shelters found" distinguishable from "shelter query failed".
#[derive(Debug, Clone, PartialEq)]
pub enum Metric<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Metric<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Metric::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Available(_))
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            Metric::Available(value) => Some(value),
            Metric::Unavailable { .. } => None,
        }
    }

    pub fn as_ref(&self) -> Metric<&T> {
        match self {
            Metric::Available(value) => Metric::Available(value),
            Metric::Unavailable { reason } => Metric::Unavailable {
                reason: reason.clone(),
            },
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Metric<U> {
        match self {
            Metric::Available(value) => Metric::Available(f(value)),
            Metric::Unavailable { reason } => Metric::Unavailable { reason },
        }
    }
}

impl<T: Serialize> Serialize for Metric<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Available(value) => value.serialize(serializer),
            Metric::Unavailable { reason } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("status", "unavailable")?;
                map.serialize_entry("reason", reason)?;
                map.end()
            }
        }
    }
}

/// Dark distance divided by lit distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DarkToLitRatio {
    /// Both distances are zero
    Undefined,
    /// No lit distance at all, some dark distance
    Infinite,
    /// `dark / lit` rounded to 2 decimals
    Value(f64),
}

impl DarkToLitRatio {
    pub fn new(lit_km: f64, dark_km: f64) -> Self {
        if lit_km == 0.0 && dark_km == 0.0 {
            DarkToLitRatio::Undefined
        } else if lit_km == 0.0 {
            DarkToLitRatio::Infinite
        } else {
            DarkToLitRatio::Value(round_to(dark_km / lit_km, 2))
        }
    }
}

impl Serialize for DarkToLitRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DarkToLitRatio::Undefined => serializer.serialize_str("undefined"),
            DarkToLitRatio::Infinite => serializer.serialize_str("infinite"),
            DarkToLitRatio::Value(value) => serializer.serialize_f64(*value),
        }
    }
}

/// Lit/dark split of a route, in kilometers
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LightingSplit {
    pub lit_km: f64,
    pub dark_km: f64,
}

impl LightingSplit {
    pub fn total_km(&self) -> f64 {
        self.lit_km + self.dark_km
    }

    pub fn ratio(&self) -> DarkToLitRatio {
        DarkToLitRatio::new(self.lit_km, self.dark_km)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LightingSummary {
    #[serde(serialize_with = "serialize_km")]
    pub lit_distance_km: f64,
    #[serde(serialize_with = "serialize_km")]
    pub dark_distance_km: f64,
    pub dark_to_lit_ratio: DarkToLitRatio,
}

impl From<LightingSplit> for LightingSummary {
    fn from(split: LightingSplit) -> Self {
        Self {
            lit_distance_km: split.lit_km,
            dark_distance_km: split.dark_km,
            dark_to_lit_ratio: split.ratio(),
        }
    }
}

/// Boolean proximity flags, one per hazard category plus the walking street test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HazardFlags {
    pub near_construction: Metric<bool>,
    pub near_night_work: Metric<bool>,
    pub near_road_work: Metric<bool>,
    pub on_walking_street: Metric<bool>,
}

/// Data-quality problems found while aggregating; never fatal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// lit + dark distance does not reconcile with the route length
    GeometryReconciliationMismatch {
        route_distance_km: f64,
        measured_distance_km: f64,
    },
}

/// Safety metrics of one route, ready for narrative scoring
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyMetrics {
    pub route_index: usize,
    #[serde(serialize_with = "serialize_km")]
    pub distance_km: f64,
    pub lighting: Metric<LightingSummary>,
    pub shelter_count: Metric<usize>,
    #[serde(flatten)]
    pub hazards: HazardFlags,
    pub warnings: Vec<DataQualityWarning>,
}

impl SafetyMetrics {
    pub fn lit_distance_km(&self) -> Option<f64> {
        self.lighting.available().map(|l| l.lit_distance_km)
    }

    pub fn dark_distance_km(&self) -> Option<f64> {
        self.lighting.available().map(|l| l.dark_distance_km)
    }

    pub fn dark_to_lit_ratio(&self) -> Option<DarkToLitRatio> {
        self.lighting.available().map(|l| l.dark_to_lit_ratio)
    }
}

/// Composes analyzer outputs into a [`SafetyMetrics`] record and checks that
/// the lit/dark split reconciles with the route length
#[derive(Debug, Clone, Copy)]
pub struct MetricsAggregator {
    tolerance_km: f64,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(crate::DEFAULT_RECONCILIATION_TOLERANCE_KM)
    }
}

impl MetricsAggregator {
    pub fn new(tolerance_km: f64) -> Self {
        Self { tolerance_km }
    }

    pub fn aggregate(
        &self,
        route: &Route,
        lighting: Metric<LightingSplit>,
        shelter_count: Metric<usize>,
        hazards: HazardFlags,
    ) -> SafetyMetrics {
        let mut warnings = Vec::new();

        if let Metric::Available(split) = &lighting {
            let measured = split.total_km();
            if (measured - route.distance_km()).abs() > self.tolerance_km {
                log::warn!(
                    "Route {}: lit + dark distance {measured:.4} km does not match route length {:.4} km",
                    route.route_index(),
                    route.distance_km()
                );
                warnings.push(DataQualityWarning::GeometryReconciliationMismatch {
                    route_distance_km: route.distance_km(),
                    measured_distance_km: measured,
                });
            }
        }

        SafetyMetrics {
            route_index: route.route_index(),
            distance_km: route.distance_km(),
            lighting: lighting.map(LightingSummary::from),
            shelter_count,
            hazards,
            warnings,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Serializes a distance in kilometers rounded to meters
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn serialize_km<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 3))
}
