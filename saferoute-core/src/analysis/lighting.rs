//! Lit/dark segmentation of a route

use geo::{Coord, CoordsIter, Distance, Euclidean, Line};
use rstar::RTree;

use super::{
    metrics::LightingSplit,
    projected::{ProjectedFeatures, ProjectedRoute},
};
use crate::Meters;

/// Decides whether a route segment (metric frame) counts as lit
pub trait LightingClassifier: Send + Sync {
    fn is_lit(&self, segment: &Line<f64>) -> bool;
}

/// Classifies a segment as lit when a light lies strictly closer than
/// `radius` to either of its endpoints.
///
/// Only the endpoints are checked, so a long segment passing a light midway
/// is dark; a continuous classifier can replace this one behind
/// [`LightingClassifier`].
#[derive(Debug, Clone)]
pub struct EndpointLightingClassifier {
    lights: RTree<[f64; 2]>,
    radius: Meters,
}

impl EndpointLightingClassifier {
    /// Every vertex of every light geometry counts as a light position
    pub fn new(lights: &ProjectedFeatures, radius: Meters) -> Self {
        let positions = lights
            .geometries()
            .iter()
            .flat_map(|geometry| geometry.coords_iter())
            .map(|c| [c.x, c.y])
            .collect();

        Self {
            lights: RTree::bulk_load(positions),
            radius,
        }
    }

    fn near_light(&self, c: Coord<f64>) -> bool {
        self.lights
            .nearest_neighbor(&[c.x, c.y])
            .is_some_and(|light| (light[0] - c.x).hypot(light[1] - c.y) < self.radius)
    }
}

impl LightingClassifier for EndpointLightingClassifier {
    fn is_lit(&self, segment: &Line<f64>) -> bool {
        self.near_light(segment.start) || self.near_light(segment.end)
    }
}

/// Accumulates segment lengths into lit and dark distance
pub fn split_lighting(route: &ProjectedRoute, classifier: &dyn LightingClassifier) -> LightingSplit {
    let mut split = LightingSplit::default();

    for segment in route.line().lines() {
        let length_km = Euclidean.distance(segment.start_point(), segment.end_point()) / 1000.0;
        if classifier.is_lit(&segment) {
            split.lit_km += length_km;
        } else {
            split.dark_km += length_km;
        }
    }

    log::debug!(
        "Lighting split: {:.3} km lit, {:.3} km dark",
        split.lit_km,
        split.dark_km
    );
    split
}
