use geojson::{Feature, Geometry, GeometryValue};
use serde_json::{Map, Value as JsonValue, json};

use super::dual_path::Route;
use crate::Error;

impl Route {
    /// Converts the route to a `GeoJSON` LineString feature.
    ///
    /// `extra` properties (for instance serialized safety metrics) are merged
    /// over the route's own properties.
    pub fn to_feature(&self, extra: Option<Map<String, JsonValue>>) -> Result<Feature, Error> {
        let geometry = Geometry::new(GeometryValue::from(self.geometry()));

        let mut value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "route_index": self.route_index(),
                "variant": self.variant(),
                "distance_km": self.distance_km(),
                "safety_weight": self.safety_weight(),
                "nodes": self.nodes(),
            }
        });

        if let Some(extra) = extra
            && let Some(properties) = value["properties"].as_object_mut()
        {
            properties.extend(extra);
        }

        serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}
