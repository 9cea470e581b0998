//! Transverse Mercator projection using Krüger's series in the third
//! flattening (4th order), accurate to well below a millimetre within a few
//! degrees of the central meridian.

use super::ellipsoid::Ellipsoid;

#[derive(Debug, Clone, PartialEq)]
pub struct TransverseMercator {
    lon0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
    e: f64,
    /// Rectifying radius
    a_hat: f64,
    alpha: [f64; 4],
    beta: [f64; 4],
    delta: [f64; 3],
    /// Rectifying latitude of the origin
    xi0: f64,
}

impl TransverseMercator {
    pub fn new(
        ellipsoid: Ellipsoid,
        lat0: f64,
        lon0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let n = ellipsoid.n();
        let (n2, n3, n4) = (n * n, n * n * n, n * n * n * n);

        let a_hat = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0);
        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0,
            49561.0 * n4 / 161_280.0,
        ];
        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0,
            4397.0 * n4 / 161_280.0,
        ];
        let delta = [
            2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
            7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
            56.0 * n3 / 15.0,
        ];

        let mut projection = Self {
            lon0,
            k0,
            false_easting,
            false_northing,
            e: ellipsoid.e2().sqrt(),
            a_hat,
            alpha,
            beta,
            delta,
            xi0: 0.0,
        };
        let (xi0, _) = projection.rectifying(0.0, lat0.to_radians());
        projection.xi0 = xi0;
        projection
    }

    /// Universal Transverse Mercator zone on WGS84
    pub fn utm(zone: u8, north: bool) -> Self {
        let lon0 = f64::from(zone) * 6.0 - 183.0;
        let false_northing = if north { 0.0 } else { 10_000_000.0 };
        Self::new(Ellipsoid::WGS84, 0.0, lon0, 0.9996, 500_000.0, false_northing)
    }

    /// Geodetic degrees (on the projection's ellipsoid) to easting/northing
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let dlon = (lon - self.lon0).to_radians();
        let (xi, eta) = self.rectifying(dlon, lat.to_radians());

        let scale = self.k0 * self.a_hat;
        (
            self.false_easting + scale * eta,
            self.false_northing + scale * (xi - self.xi0),
        )
    }

    /// Easting/northing to geodetic degrees (on the projection's ellipsoid)
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let scale = self.k0 * self.a_hat;
        let xi = (y - self.false_northing) / scale + self.xi0;
        let eta = (x - self.false_easting) / scale;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let lat = chi
            + self
                .delta
                .iter()
                .enumerate()
                .map(|(j, delta)| delta * (2.0 * (j + 1) as f64 * chi).sin())
                .sum::<f64>();
        let dlon = eta_p.sinh().atan2(xi_p.cos());

        (self.lon0 + dlon.to_degrees(), lat.to_degrees())
    }

    /// Gauss-Krüger coordinates (xi, eta) on the unit rectifying sphere
    fn rectifying(&self, dlon: f64, lat: f64) -> (f64, f64) {
        let sin_lat = lat.sin();
        let t = (sin_lat.atanh() - self.e * (self.e * sin_lat).atanh()).sinh();
        let xi_p = t.atan2(dlon.cos());
        let eta_p = (dlon.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }
        (xi, eta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utm_central_meridian_on_equator() {
        let utm = TransverseMercator::utm(31, true);
        let (x, y) = utm.forward(3.0, 0.0);
        assert!((x - 500_000.0).abs() < 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn utm_known_point() {
        // 1 degree east of the central meridian at 45N, zone 31
        let utm = TransverseMercator::utm(31, true);
        let (x, y) = utm.forward(4.0, 45.0);
        assert!((x - 578_815.303).abs() < 0.01, "easting {x}");
        assert!((y - 4_983_436.768).abs() < 0.01, "northing {y}");
    }

    #[test]
    fn origin_maps_to_false_origin() {
        let tm = TransverseMercator::new(Ellipsoid::GRS80, 31.7, 35.2, 1.0, 1000.0, 2000.0);
        let (x, y) = tm.forward(35.2, 31.7);
        assert!((x - 1000.0).abs() < 1e-6);
        assert!((y - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn inverse_recovers_forward() {
        let tm = TransverseMercator::utm(36, true);
        for &(lon, lat) in &[(34.77, 32.08), (33.1, 29.5), (35.9, 33.3)] {
            let (x, y) = tm.forward(lon, lat);
            let (lon2, lat2) = tm.inverse(x, y);
            assert!((lon - lon2).abs() < 1e-8, "lon {lon} -> {lon2}");
            assert!((lat - lat2).abs() < 1e-8, "lat {lat} -> {lat2}");
        }
    }
}
