//! Safe walking routes with municipal safety data.
//!
//! Wires the routing and analysis engine of [`saferoute_core`] to its
//! external collaborators: feature sources (in-memory, `GeoJSON`, ArcGIS map
//! services), an optional narrative scorer, and a bounded worker pool with
//! cancellation and a per-request deadline.

pub mod cancellation;
pub mod config;
pub mod error;
pub mod narrative;
pub mod providers;
pub mod report;
pub mod service;

pub use saferoute_core;
pub use saferoute_core::prelude;

pub use cancellation::{CancellationToken, RequestBudget};
pub use config::ServiceConfig;
pub use error::{Error, FeatureQueryError, NarrativeError};
pub use narrative::{NarrativeConfig, NarrativeRequest, NarrativeResult, NarrativeScorer, PromptBuilder};
pub use providers::{
    EsriFeatureProvider, EsriLayer, EsriServiceConfig, FeatureProvider, HttpTransport,
    InMemoryFeatureProvider, QueryEnvelope,
};
pub use report::{RouteAnalysis, RouteFailure, RouteReport};
pub use service::{Endpoint, SafeRouteService};
