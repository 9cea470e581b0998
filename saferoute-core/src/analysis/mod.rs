//! Proximity analysis of routes against safety features and aggregation of
//! the results into per-route safety metrics.

mod config;
pub mod lighting;
pub mod metrics;
mod projected;
mod proximity;

pub use config::{AnalysisConfig, ProximityRadii};
pub use lighting::{EndpointLightingClassifier, LightingClassifier, split_lighting};
pub use metrics::{
    DarkToLitRatio, DataQualityWarning, HazardFlags, LightingSplit, LightingSummary, Metric,
    MetricsAggregator, SafetyMetrics,
};
pub use projected::{ProjectedFeatures, ProjectedRoute};
pub use proximity::{CategoryFeatures, ProximityAnalyzer};
