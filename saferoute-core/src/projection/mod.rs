//! Conversion between geographic coordinates (WGS84 lon/lat degrees) and a
//! metric projected CRS, so that distances and buffers can be computed in
//! meters.

mod ellipsoid;
mod transverse_mercator;

use geo::{Coord, Geometry, LineString, MapCoords, Point, Rect, coord};
use serde::{Deserialize, Serialize};

pub use ellipsoid::{DatumShift, Ellipsoid};
pub use transverse_mercator::TransverseMercator;

/// Metric CRS used for distance and buffer computations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricCrs {
    /// Israeli Transverse Mercator grid (EPSG:2039)
    #[default]
    IsraeliTmGrid,
    /// UTM zone on WGS84 (EPSG:326xx / 327xx)
    Utm { zone: u8, north: bool },
}

impl MetricCrs {
    pub fn epsg(self) -> u32 {
        match self {
            MetricCrs::IsraeliTmGrid => 2039,
            MetricCrs::Utm { zone, north: true } => 32600 + u32::from(zone),
            MetricCrs::Utm { zone, north: false } => 32700 + u32::from(zone),
        }
    }
}

/// Stateless pair of transforms between WGS84 and a metric CRS
#[derive(Debug, Clone, PartialEq)]
pub struct Reprojector {
    crs: MetricCrs,
    projection: TransverseMercator,
    datum: Option<DatumShift>,
}

impl Default for Reprojector {
    fn default() -> Self {
        Self::new(MetricCrs::default())
    }
}

impl Reprojector {
    pub fn new(crs: MetricCrs) -> Self {
        match crs {
            MetricCrs::IsraeliTmGrid => Self {
                crs,
                projection: TransverseMercator::new(
                    Ellipsoid::GRS80,
                    31.734_393_611_111_1,
                    35.204_516_944_444_4,
                    1.000_006_7,
                    219_529.584,
                    626_907.39,
                ),
                datum: Some(DatumShift {
                    ellipsoid: Ellipsoid::GRS80,
                    to_wgs84: [-48.0, 55.0, 52.0],
                }),
            },
            MetricCrs::Utm { zone, north } => Self {
                crs,
                projection: TransverseMercator::utm(zone, north),
                datum: None,
            },
        }
    }

    pub fn crs(&self) -> MetricCrs {
        self.crs
    }

    /// WGS84 (lon, lat) in degrees to metric (x, y)
    pub fn to_metric(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (lon, lat) = match &self.datum {
            Some(shift) => shift.from_wgs84(lon, lat),
            None => (lon, lat),
        };
        self.projection.forward(lon, lat)
    }

    /// Metric (x, y) to WGS84 (lon, lat) in degrees
    pub fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        let (lon, lat) = self.projection.inverse(x, y);
        match &self.datum {
            Some(shift) => shift.to_wgs84(lon, lat),
            None => (lon, lat),
        }
    }

    /// Metric envelope `(xmin, ymin, xmax, ymax)` covering a geographic
    /// bounding box, used for spatial queries against metric feature sources
    pub fn project_bbox(
        &self,
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    ) -> (f64, f64, f64, f64) {
        // grid north is not true north away from the central meridian,
        // so all four corners are needed
        let corners = [
            self.to_metric(min_lon, min_lat),
            self.to_metric(min_lon, max_lat),
            self.to_metric(max_lon, min_lat),
            self.to_metric(max_lon, max_lat),
        ];
        corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(xmin, ymin, xmax, ymax), &(x, y)| (xmin.min(x), ymin.min(y), xmax.max(x), ymax.max(y)),
        )
    }

    pub fn project_rect(&self, rect: &Rect<f64>) -> Rect<f64> {
        let (xmin, ymin, xmax, ymax) =
            self.project_bbox(rect.min().x, rect.min().y, rect.max().x, rect.max().y);
        Rect::new(coord! { x: xmin, y: ymin }, coord! { x: xmax, y: ymax })
    }

    /// Geographic bounding box covering a metric envelope
    pub fn unproject_rect(&self, rect: &Rect<f64>) -> Rect<f64> {
        let corners = [
            self.to_geographic(rect.min().x, rect.min().y),
            self.to_geographic(rect.min().x, rect.max().y),
            self.to_geographic(rect.max().x, rect.min().y),
            self.to_geographic(rect.max().x, rect.max().y),
        ];
        let (min_lon, min_lat, max_lon, max_lat) = corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(xmin, ymin, xmax, ymax), &(x, y)| (xmin.min(x), ymin.min(y), xmax.max(x), ymax.max(y)),
        );
        Rect::new(
            coord! { x: min_lon, y: min_lat },
            coord! { x: max_lon, y: max_lat },
        )
    }

    pub fn project_coord(&self, c: Coord<f64>) -> Coord<f64> {
        let (x, y) = self.to_metric(c.x, c.y);
        coord! { x: x, y: y }
    }

    pub fn unproject_coord(&self, c: Coord<f64>) -> Coord<f64> {
        let (lon, lat) = self.to_geographic(c.x, c.y);
        coord! { x: lon, y: lat }
    }

    pub fn project_point(&self, point: &Point<f64>) -> Point<f64> {
        self.project_coord(point.0).into()
    }

    pub fn project_line_string(&self, line: &LineString<f64>) -> LineString<f64> {
        line.map_coords(|c| self.project_coord(c))
    }

    pub fn project_geometry(&self, geometry: &Geometry<f64>) -> Geometry<f64> {
        geometry.map_coords(|c| self.project_coord(c))
    }

    pub fn unproject_geometry(&self, geometry: &Geometry<f64>) -> Geometry<f64> {
        geometry.map_coords(|c| self.unproject_coord(c))
    }
}

#[cfg(test)]
mod tests {
    use geo::{Distance, Euclidean, Geodesic, point};

    use super::*;

    const TEL_AVIV: [(f64, f64); 4] = [
        (34.7818, 32.0853),
        (34.770606, 32.081301),
        (34.7506, 32.0504),
        (34.8044, 32.1133),
    ];

    #[test]
    fn round_trip_stays_sub_meter() {
        let reprojector = Reprojector::default();
        for &(lon, lat) in &TEL_AVIV {
            let (x, y) = reprojector.to_metric(lon, lat);
            let (lon2, lat2) = reprojector.to_geographic(x, y);
            let error = Geodesic.distance(point!(x: lon, y: lat), point!(x: lon2, y: lat2));
            assert!(error < 0.01, "round trip error {error} m at ({lon}, {lat})");
        }
    }

    #[test]
    fn israeli_grid_places_tel_aviv_in_range() {
        let (x, y) = Reprojector::default().to_metric(34.7818, 32.0853);
        assert!((x - 179_549.6).abs() < 1.0, "easting {x}");
        assert!((y - 665_848.1).abs() < 1.0, "northing {y}");
    }

    #[test]
    fn metric_distance_matches_geodesic() {
        let reprojector = Reprojector::default();
        let a = point!(x: 34.770606, y: 32.081301);
        let b = point!(x: 34.773358, y: 32.088658);
        let metric = Euclidean.distance(reprojector.project_point(&a), reprojector.project_point(&b));
        let geodesic = Geodesic.distance(a, b);
        assert!((metric - geodesic).abs() < 0.05, "{metric} vs {geodesic}");
    }

    #[test]
    fn bbox_covers_all_corners() {
        let reprojector = Reprojector::new(MetricCrs::Utm { zone: 36, north: true });
        let (xmin, ymin, xmax, ymax) = reprojector.project_bbox(34.76, 32.07, 34.79, 32.09);
        for (lon, lat) in [(34.76, 32.07), (34.76, 32.09), (34.79, 32.07), (34.79, 32.09)] {
            let (x, y) = reprojector.to_metric(lon, lat);
            assert!(x >= xmin && x <= xmax && y >= ymin && y <= ymax);
        }
        assert_eq!(reprojector.crs().epsg(), 32636);
    }

    #[test]
    fn unprojected_rect_covers_metric_envelope() {
        let reprojector = Reprojector::default();
        let geographic = Rect::new(coord! { x: 34.77, y: 32.07 }, coord! { x: 34.78, y: 32.08 });
        let metric = reprojector.project_rect(&geographic);
        let back = reprojector.unproject_rect(&metric);
        assert!(back.min().x <= 34.77 + 1e-9 && back.min().y <= 32.07 + 1e-9);
        assert!(back.max().x >= 34.78 - 1e-9 && back.max().y >= 32.08 - 1e-9);
        assert!(back.width() < 0.0101 && back.height() < 0.0101);
    }
}
