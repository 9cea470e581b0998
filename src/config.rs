use std::path::Path;
use std::time::Duration;

use saferoute_core::analysis::AnalysisConfig;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::narrative::NarrativeConfig;
use crate::providers::EsriServiceConfig;

/// Settings of a [`SafeRouteService`](crate::SafeRouteService), usually read from TOML.
///
/// ```toml
/// worker_threads = 4
/// request_timeout_secs = 20
///
/// [analysis]
/// reconciliation_tolerance_km = 0.002
///
/// [analysis.radii]
/// shelter = 50.0
///
/// [narrative]
/// model = "gemini-2.5-flash"
/// concise = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub analysis: AnalysisConfig,
    /// Size of the feature query pool
    pub worker_threads: usize,
    /// Budget of one request, feature queries and narrative included
    pub request_timeout_secs: u64,
    pub esri: EsriServiceConfig,
    /// Narrative scoring is skipped when absent
    pub narrative: Option<NarrativeConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            worker_threads: 4,
            request_timeout_secs: 30,
            esri: EsriServiceConfig::default(),
            narrative: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use saferoute_core::model::FeatureCategory;
    use saferoute_core::projection::MetricCrs;

    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.analysis.metric_crs, MetricCrs::IsraeliTmGrid);
    }

    #[test]
    fn test_partial_override() {
        let config = ServiceConfig::from_toml_str(
            r#"
            worker_threads = 2
            request_timeout_secs = 5

            [analysis]
            reconciliation_tolerance_km = 0.002

            [analysis.metric_crs]
            kind = "utm"
            zone = 36
            north = true

            [analysis.radii]
            shelter = 50.0

            [[esri.layers]]
            category = "light"
            layer_id = 1

            [narrative]
            concise = false
            "#,
        )
        .unwrap();

        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert!((config.analysis.reconciliation_tolerance_km - 0.002).abs() < 1e-12);
        assert_eq!(
            config.analysis.metric_crs,
            MetricCrs::Utm {
                zone: 36,
                north: true
            }
        );
        assert!((config.analysis.radii.shelter - 50.0).abs() < 1e-12);
        assert!((config.analysis.radii.light - 25.0).abs() < 1e-12);
        assert_eq!(config.esri.layer_id(FeatureCategory::Light), Some(1));
        assert_eq!(config.esri.layer_id(FeatureCategory::Shelter), None);

        let narrative = config.narrative.unwrap();
        assert!(!narrative.concise);
        assert_eq!(narrative.model, NarrativeConfig::default().model);
    }

    #[test]
    fn test_invalid_document() {
        let result = ServiceConfig::from_toml_str("worker_threads = \"many\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
