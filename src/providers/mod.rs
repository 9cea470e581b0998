//! Sources of municipal geodata for the proximity analysis.
//!
//! A provider answers one query per feature category for the bounding
//! envelope of a route. Failures are per category and never abort the
//! request.

mod esri;
mod geojson_source;
mod memory;

pub use esri::{EsriFeatureProvider, EsriLayer, EsriServiceConfig, HttpTransport};
pub use geojson_source::{feature_set_from_geojson, feature_set_from_geojson_reader};
pub use memory::InMemoryFeatureProvider;

use geo::{BoundingRect, LineString, Rect, coord};
use saferoute_core::model::{FeatureCategory, FeatureSet};
use saferoute_core::projection::Reprojector;

use crate::cancellation::RequestBudget;
use crate::error::FeatureQueryError;

/// Area searched for the features of one route
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryEnvelope {
    /// Route bounding box in longitude/latitude, widened by the margin
    pub geographic: Rect<f64>,
    /// The same area in the metric reference system
    pub metric: Rect<f64>,
    /// EPSG code of `metric`
    pub metric_epsg: u32,
}

impl QueryEnvelope {
    /// Envelope of `route` widened by `margin` meters on every side.
    ///
    /// The margin keeps features that sit just outside the route's
    /// bounding box but still inside a proximity radius.
    pub fn around(route: &LineString<f64>, reprojector: &Reprojector, margin: f64) -> Option<Self> {
        let rect = reprojector.project_rect(&route.bounding_rect()?);
        let metric = Rect::new(
            coord! { x: rect.min().x - margin, y: rect.min().y - margin },
            coord! { x: rect.max().x + margin, y: rect.max().y + margin },
        );

        Some(Self {
            geographic: reprojector.unproject_rect(&metric),
            metric,
            metric_epsg: reprojector.crs().epsg(),
        })
    }
}

/// Answers spatial queries for one feature category at a time.
///
/// Implementations must check `budget` before doing expensive work and
/// return `Cancelled` or `TimedOut` when it has run out.
pub trait FeatureProvider: Send + Sync {
    fn query(
        &self,
        category: FeatureCategory,
        envelope: &QueryEnvelope,
        budget: &RequestBudget,
    ) -> Result<FeatureSet, FeatureQueryError>;
}
