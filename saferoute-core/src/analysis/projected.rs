//! Routes and features moved into the metric frame once, so that every
//! proximity test runs on the same coordinates.

use geo::{Geometry, LineString};

use crate::{model::FeatureSet, projection::Reprojector};

/// Route polyline in the metric CRS
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRoute {
    line: LineString<f64>,
}

impl ProjectedRoute {
    pub fn new(reprojector: &Reprojector, geographic: &LineString<f64>) -> Self {
        Self::from_metric(reprojector.project_line_string(geographic))
    }

    pub fn from_metric(line: LineString<f64>) -> Self {
        Self { line }
    }

    pub fn line(&self) -> &LineString<f64> {
        &self.line
    }
}

/// Feature geometries of one category in the metric CRS
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedFeatures {
    geometries: Vec<Geometry<f64>>,
}

impl ProjectedFeatures {
    pub fn new(reprojector: &Reprojector, features: &FeatureSet) -> Self {
        Self::from_metric(
            features
                .features
                .iter()
                .map(|feature| reprojector.project_geometry(&feature.geometry))
                .collect(),
        )
    }

    pub fn from_metric(geometries: Vec<Geometry<f64>>) -> Self {
        Self { geometries }
    }

    pub fn geometries(&self) -> &[Geometry<f64>] {
        &self.geometries
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }
}
