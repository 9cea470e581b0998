use std::time::Duration;

use saferoute_core::error::RoutingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] saferoute_core::Error),
    #[error(transparent)]
    Routing(#[from] RoutingError),
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Failure of a single feature query. Recoverable: only the affected
/// category becomes unavailable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureQueryError {
    #[error("Feature source unreachable: {0}")]
    Unreachable(String),
    #[error("Malformed feature response: {0}")]
    Malformed(String),
    #[error("Feature query cancelled")]
    Cancelled,
    #[error("Feature query timed out after {0:?}")]
    TimedOut(Duration),
}

/// Failure of the narrative scoring collaborator
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Narrative scoring failed: {0}")]
pub struct NarrativeError(pub String);
