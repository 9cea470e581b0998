// Re-export key components
pub use crate::analysis::{
    AnalysisConfig, CategoryFeatures, DarkToLitRatio, HazardFlags, Metric, ProximityAnalyzer,
    ProximityRadii, SafetyMetrics,
};
pub use crate::error::{Error, RoutingError};
pub use crate::loading::StreetGraphBuilder;
pub use crate::model::{EdgeAttributes, Feature, FeatureCategory, FeatureSet, StreetGraph};
pub use crate::projection::{MetricCrs, Reprojector};
pub use crate::routing::{
    DualPathRouter, EdgeCost, Route, RoutePair, RouteVariant, SafetyScorer, SafetyScorerConfig,
    route,
};

// Core types for the street network
pub use crate::Meters;
pub use crate::StreetNodeId;
