//! Reference ellipsoids and geocentric datum shifts

/// Reference ellipsoid given by semi-major axis and flattening
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub a: f64,
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    /// First eccentricity squared
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// Third flattening
    pub fn n(&self) -> f64 {
        self.f / (2.0 - self.f)
    }

    /// Geodetic (degrees, ellipsoidal height 0) to earth-centred cartesian
    pub fn to_geocentric(&self, lon: f64, lat: f64) -> [f64; 3] {
        let (lon, lat) = (lon.to_radians(), lat.to_radians());
        let e2 = self.e2();
        let nu = self.a / (1.0 - e2 * lat.sin().powi(2)).sqrt();
        [
            nu * lat.cos() * lon.cos(),
            nu * lat.cos() * lon.sin(),
            nu * (1.0 - e2) * lat.sin(),
        ]
    }

    /// Earth-centred cartesian to geodetic degrees (height discarded)
    pub fn from_geocentric(&self, xyz: [f64; 3]) -> (f64, f64) {
        let [x, y, z] = xyz;
        let e2 = self.e2();
        let p = x.hypot(y);
        let lon = y.atan2(x);

        let mut lat = z.atan2(p * (1.0 - e2));
        for _ in 0..10 {
            let nu = self.a / (1.0 - e2 * lat.sin().powi(2)).sqrt();
            let height = p / lat.cos() - nu;
            let next = z.atan2(p * (1.0 - e2 * nu / (nu + height)));
            if (next - lat).abs() < 1e-14 {
                lat = next;
                break;
            }
            lat = next;
        }

        (lon.to_degrees(), lat.to_degrees())
    }
}

/// Three-parameter geocentric translation from a local datum to WGS84
/// (the `towgs84` parameters of a CRS definition)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatumShift {
    pub ellipsoid: Ellipsoid,
    pub to_wgs84: [f64; 3],
}

impl DatumShift {
    /// WGS84 geodetic to geodetic on the local datum
    pub fn from_wgs84(&self, lon: f64, lat: f64) -> (f64, f64) {
        let [x, y, z] = Ellipsoid::WGS84.to_geocentric(lon, lat);
        let [dx, dy, dz] = self.to_wgs84;
        self.ellipsoid.from_geocentric([x - dx, y - dy, z - dz])
    }

    /// Local datum geodetic to WGS84 geodetic
    pub fn to_wgs84(&self, lon: f64, lat: f64) -> (f64, f64) {
        let [x, y, z] = self.ellipsoid.to_geocentric(lon, lat);
        let [dx, dy, dz] = self.to_wgs84;
        Ellipsoid::WGS84.from_geocentric([x + dx, y + dy, z + dz])
    }
}
