//! Optional free-text scoring of a route by an external model.
//!
//! The crate only renders the prompt and forwards it; the scorer is a
//! collaborator supplied by the caller.

use saferoute_core::analysis::SafetyMetrics;
use saferoute_core::routing::Route;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::NarrativeError;

/// Settings handed to the narrative scorer with every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub model: String,
    /// Background sources the answer must rely on
    pub sources: Vec<String>,
    pub question: String,
    /// Ask for a short answer
    pub concise: bool,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            sources: Vec::new(),
            question: "Score the route from 1 (unsafe) to 10 (very safe), and explain the \
                       reasoning using only the sources provided."
                .into(),
            concise: true,
        }
    }
}

/// Opaque answer of the scorer, passed through to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NarrativeResult(pub JsonValue);

/// Everything a scorer gets to see about one route
#[derive(Debug, Clone, Copy)]
pub struct NarrativeRequest<'a> {
    pub route: &'a Route,
    pub metrics: &'a SafetyMetrics,
    pub config: &'a NarrativeConfig,
}

impl NarrativeRequest<'_> {
    pub fn prompt(&self) -> String {
        PromptBuilder::new(self.config).build(self.route, self.metrics)
    }
}

pub trait NarrativeScorer: Send + Sync {
    fn score(&self, request: &NarrativeRequest<'_>) -> Result<NarrativeResult, NarrativeError>;
}

/// Renders a metrics record into the scoring prompt
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder<'a> {
    config: &'a NarrativeConfig,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(config: &'a NarrativeConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, route: &Route, metrics: &SafetyMetrics) -> String {
        let mut prompt = String::new();

        if !self.config.sources.is_empty() {
            prompt.push_str("Based on the following sources:\n");
            prompt.push_str(&self.config.sources.join("\n"));
            prompt.push_str("\n\n");
        }

        prompt.push_str(
            "Please evaluate the safety of the following route based only on the sources above.\n",
        );
        prompt.push_str(&Self::describe(route, metrics));
        prompt.push_str("\n\n");
        prompt.push_str(&self.config.question);

        if self.config.concise {
            prompt.push_str("\n\nPlease answer concisely.");
        }
        prompt
    }

    fn describe(route: &Route, metrics: &SafetyMetrics) -> String {
        let coordinates = route.coordinates();
        let endpoint = |c: Option<&(f64, f64)>| {
            c.map_or_else(|| "unknown".to_string(), |(lon, lat)| format!("{lat:.6}, {lon:.6}"))
        };
        let metrics = serde_json::to_string_pretty(metrics)
            .unwrap_or_else(|e| format!("unavailable ({e})"));

        format!(
            "Route {} ({})\nStart: {}\nEnd: {}\nTotal distance: {:.3} km\nSafety metrics:\n{metrics}",
            route.route_index(),
            route.variant(),
            endpoint(coordinates.first()),
            endpoint(coordinates.last()),
            route.distance_km(),
        )
    }
}
