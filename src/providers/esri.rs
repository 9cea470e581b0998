use std::time::Duration;

use geo::{
    Geometry, Intersects, LineString, MultiLineString, MultiPolygon, Point, Polygon, Winding,
    winding_order::WindingOrder,
};
use saferoute_core::model::{Feature, FeatureCategory, FeatureSet};
use saferoute_core::projection::Reprojector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::{FeatureProvider, QueryEnvelope};
use crate::cancellation::RequestBudget;
use crate::error::FeatureQueryError;

const WGS84_WKID: u32 = 4326;

/// Upper bound on result pages fetched for one query
const MAX_PAGES: usize = 50;

/// One map-service layer serving a feature category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsriLayer {
    pub category: FeatureCategory,
    pub layer_id: u32,
}

/// Location and layer table of an ArcGIS map service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EsriServiceConfig {
    pub base_url: String,
    pub layers: Vec<EsriLayer>,
}

impl Default for EsriServiceConfig {
    fn default() -> Self {
        let layer = |category, layer_id| EsriLayer { category, layer_id };
        Self {
            base_url: "https://gisn.tel-aviv.gov.il/arcgis/rest/services/IView2/MapServer".into(),
            layers: vec![
                layer(FeatureCategory::Light, 543),
                layer(FeatureCategory::Shelter, 592),
                layer(FeatureCategory::Construction, 479),
                layer(FeatureCategory::NightWork, 858),
                layer(FeatureCategory::RoadWork, 852),
                layer(FeatureCategory::WalkingStreet, 659),
            ],
        }
    }
}

impl EsriServiceConfig {
    pub fn layer_id(&self, category: FeatureCategory) -> Option<u32> {
        self.layers
            .iter()
            .find(|layer| layer.category == category)
            .map(|layer| layer.layer_id)
    }

    pub fn query_url(&self, category: FeatureCategory) -> Option<String> {
        self.layer_id(category).map(|id| {
            format!("{}/{id}/query", self.base_url.trim_end_matches('/'))
        })
    }
}

/// Blocking GET against a map service.
///
/// Errors should be reported as `Unreachable` (network, HTTP status) or
/// `TimedOut`; the provider maps the body itself.
pub trait HttpTransport: Send + Sync {
    fn get(
        &self,
        url: &str,
        params: &[(&'static str, String)],
        timeout: Duration,
    ) -> Result<String, FeatureQueryError>;
}

/// Feature provider backed by an ArcGIS REST map service
pub struct EsriFeatureProvider<T> {
    config: EsriServiceConfig,
    reprojector: Reprojector,
    transport: T,
}

impl<T: HttpTransport> EsriFeatureProvider<T> {
    pub fn new(config: EsriServiceConfig, reprojector: Reprojector, transport: T) -> Self {
        Self {
            config,
            reprojector,
            transport,
        }
    }

    pub fn config(&self) -> &EsriServiceConfig {
        &self.config
    }

    /// Envelope query in the service's metric reference system, starting
    /// at record `offset` of the result
    pub fn query_params(envelope: &QueryEnvelope, offset: usize) -> Vec<(&'static str, String)> {
        let rect = envelope.metric;
        let srs = envelope.metric_epsg.to_string();
        vec![
            ("where", "1=1".into()),
            ("outFields", "*".into()),
            ("returnGeometry", "true".into()),
            ("f", "json".into()),
            (
                "geometry",
                format!(
                    "{},{},{},{}",
                    rect.min().x,
                    rect.min().y,
                    rect.max().x,
                    rect.max().y
                ),
            ),
            ("geometryType", "esriGeometryEnvelope".into()),
            ("spatialRel", "esriSpatialRelIntersects".into()),
            ("inSR", srs.clone()),
            ("outSR", srs),
            ("resultOffset", offset.to_string()),
        ]
    }

    /// Parses a complete query response body into longitude/latitude
    /// features.
    ///
    /// # Errors
    ///
    /// A body flagged as truncated by the service is `Malformed`, since the
    /// remaining records are missing.
    pub fn parse_response(
        &self,
        category: FeatureCategory,
        body: &str,
    ) -> Result<FeatureSet, FeatureQueryError> {
        let page = self.parse_page(body)?;
        if page.exceeded_transfer_limit {
            return Err(truncated(page.records));
        }
        Ok(FeatureSet::new(category, page.features))
    }

    fn parse_page(&self, body: &str) -> Result<Page, FeatureQueryError> {
        let response: EsriResponse =
            serde_json::from_str(body).map_err(|e| FeatureQueryError::Malformed(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(FeatureQueryError::Unreachable(format!(
                "service error {}: {}",
                error.code, error.message
            )));
        }

        let wkid = response
            .spatial_reference
            .and_then(|sr| sr.latest_wkid.or(sr.wkid))
            .unwrap_or_else(|| self.reprojector.crs().epsg());
        let metric = self.reprojector.crs().epsg();
        if wkid != metric && wkid != WGS84_WKID {
            return Err(FeatureQueryError::Malformed(format!(
                "unsupported spatial reference {wkid}"
            )));
        }

        let records = response.features.len();
        let features = response
            .features
            .into_iter()
            .filter_map(|feature| {
                let geometry = feature.geometry?.into_geometry()?;
                let geometry = if wkid == WGS84_WKID {
                    geometry
                } else {
                    self.reprojector.unproject_geometry(&geometry)
                };
                Some(Feature::new(geometry).with_attributes(feature.attributes))
            })
            .collect();

        Ok(Page {
            features,
            records,
            exceeded_transfer_limit: response.exceeded_transfer_limit,
        })
    }
}

/// One page of a query result
struct Page {
    features: Vec<Feature>,
    /// Records returned by the service, including ones without geometry
    records: usize,
    exceeded_transfer_limit: bool,
}

fn truncated(records: usize) -> FeatureQueryError {
    FeatureQueryError::Malformed(format!("result truncated at {records} features"))
}

impl<T: HttpTransport> FeatureProvider for EsriFeatureProvider<T> {
    fn query(
        &self,
        category: FeatureCategory,
        envelope: &QueryEnvelope,
        budget: &RequestBudget,
    ) -> Result<FeatureSet, FeatureQueryError> {
        let url = self.config.query_url(category).ok_or_else(|| {
            FeatureQueryError::Unreachable(format!("no layer configured for {category}"))
        })?;

        let mut features = Vec::new();
        let mut offset = 0;
        for _ in 0..MAX_PAGES {
            budget.check()?;
            let timeout = budget
                .remaining()
                .ok_or(FeatureQueryError::TimedOut(budget.timeout()))?;

            log::debug!("Querying {category} features from {url} at offset {offset}");
            let body = self
                .transport
                .get(&url, &Self::query_params(envelope, offset), timeout)?;

            // A reply that arrives after cancellation is discarded
            budget.check()?;
            let page = self.parse_page(&body)?;
            features.extend(page.features);
            offset += page.records;

            if !page.exceeded_transfer_limit {
                return Ok(FeatureSet::new(category, features));
            }
            if page.records == 0 {
                return Err(truncated(offset));
            }
        }

        log::warn!("{category} query still truncated after {MAX_PAGES} pages");
        Err(truncated(offset))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EsriResponse {
    #[serde(default)]
    features: Vec<EsriFeature>,
    spatial_reference: Option<EsriSpatialReference>,
    error: Option<EsriError>,
    #[serde(default)]
    exceeded_transfer_limit: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EsriSpatialReference {
    wkid: Option<u32>,
    latest_wkid: Option<u32>,
}

#[derive(Deserialize)]
struct EsriError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct EsriFeature {
    geometry: Option<EsriGeometry>,
    #[serde(default)]
    attributes: Map<String, JsonValue>,
}

/// Esri JSON geometry. Vertices may carry z/m values after x and y.
#[derive(Deserialize)]
#[serde(untagged)]
enum EsriGeometry {
    Polyline { paths: Vec<Vec<Vec<f64>>> },
    Polygon { rings: Vec<Vec<Vec<f64>>> },
    Point { x: Option<f64>, y: Option<f64> },
}

impl EsriGeometry {
    /// `None` for empty geometries
    fn into_geometry(self) -> Option<Geometry<f64>> {
        match self {
            Self::Point { x, y } => Some(Point::new(x?, y?).into()),
            Self::Polyline { paths } => {
                let mut lines: Vec<LineString<f64>> = paths
                    .iter()
                    .map(|path| to_line_string(path))
                    .filter(|line| line.0.len() >= 2)
                    .collect();
                match lines.len() {
                    0 => None,
                    1 => lines.pop().map(Geometry::LineString),
                    _ => Some(MultiLineString::new(lines).into()),
                }
            }
            Self::Polygon { rings } => polygon_from_rings(&rings),
        }
    }
}

/// Builds a polygon from Esri rings: clockwise rings are shells and
/// counter-clockwise rings are holes of the shell that contains them.
/// Several shells give a multipolygon.
fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Option<Geometry<f64>> {
    let mut shells: Vec<Polygon<f64>> = Vec::new();
    let mut holes: Vec<LineString<f64>> = Vec::new();
    for ring in rings {
        let mut ring = to_line_string(ring);
        if ring.0.len() < 3 {
            continue;
        }
        ring.close();
        match ring.winding_order() {
            Some(WindingOrder::Clockwise) => shells.push(Polygon::new(ring, vec![])),
            Some(WindingOrder::CounterClockwise) => holes.push(ring),
            None => {}
        }
    }

    let mut interiors: Vec<Vec<LineString<f64>>> = vec![Vec::new(); shells.len()];
    for hole in holes {
        let owner = hole
            .0
            .first()
            .and_then(|vertex| shells.iter().position(|shell| shell.intersects(vertex)));
        match owner {
            Some(index) => interiors[index].push(hole),
            // A hole outside every shell is an outer ring wound the other way
            None => {
                shells.push(Polygon::new(hole, vec![]));
                interiors.push(Vec::new());
            }
        }
    }

    let mut polygons: Vec<Polygon<f64>> = shells
        .into_iter()
        .zip(interiors)
        .map(|(shell, interiors)| Polygon::new(shell.into_inner().0, interiors))
        .collect();
    match polygons.len() {
        0 => None,
        1 => polygons.pop().map(Geometry::Polygon),
        _ => Some(MultiPolygon::new(polygons).into()),
    }
}

fn to_line_string(vertices: &[Vec<f64>]) -> LineString<f64> {
    vertices
        .iter()
        .filter_map(|v| match v.as_slice() {
            [x, y, ..] => Some((*x, *y)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .into()
}
