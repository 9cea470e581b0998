//! Core of the safe walking route engine.
//!
//! Contains the street network model, the dual-path router (shortest and
//! safety-weighted), coordinate reprojection and the proximity analysis that
//! turns municipal geodata into per-route safety metrics.

pub mod analysis;
pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod projection;
pub mod routing;

pub use error::Error;

/// External (OSM) identifier of a street node
pub type StreetNodeId = i64;

/// Length along the street network, in meters
pub type Meters = f64;

/// Default radius used for every proximity test, in meters
pub const DEFAULT_PROXIMITY_RADIUS: Meters = 25.0;

/// Default tolerance for lit + dark vs route length reconciliation, in kilometers
pub const DEFAULT_RECONCILIATION_TOLERANCE_KM: f64 = 1e-3;
