use std::io::Read;

use geojson::GeoJson;
use saferoute_core::model::{Feature, FeatureCategory, FeatureSet};
use serde_json::Map;

use crate::error::FeatureQueryError;

/// Parses a `GeoJSON` document in longitude/latitude into a feature set.
///
/// Accepts a FeatureCollection, a single Feature or a bare Geometry.
/// Features without geometry are skipped.
pub fn feature_set_from_geojson(
    category: FeatureCategory,
    text: &str,
) -> Result<FeatureSet, FeatureQueryError> {
    let document = text
        .parse::<GeoJson>()
        .map_err(|e| FeatureQueryError::Malformed(e.to_string()))?;
    from_document(category, document)
}

pub fn feature_set_from_geojson_reader(
    category: FeatureCategory,
    reader: impl Read,
) -> Result<FeatureSet, FeatureQueryError> {
    let document: GeoJson =
        serde_json::from_reader(reader).map_err(|e| FeatureQueryError::Malformed(e.to_string()))?;
    from_document(category, document)
}

fn from_document(
    category: FeatureCategory,
    document: GeoJson,
) -> Result<FeatureSet, FeatureQueryError> {
    let raw = match document {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![geojson::Feature::from(geometry)],
    };

    let mut features = Vec::with_capacity(raw.len());
    let mut skipped = 0;
    for feature in raw {
        let Some(geometry) = feature.geometry else {
            skipped += 1;
            continue;
        };
        let geometry = geo::Geometry::<f64>::try_from(geometry)
            .map_err(|e| FeatureQueryError::Malformed(e.to_string()))?;
        let attributes = feature.properties.unwrap_or_else(Map::new);
        features.push(Feature::new(geometry).with_attributes(attributes));
    }

    if skipped > 0 {
        log::debug!("Skipped {skipped} {category} features without geometry");
    }

    Ok(FeatureSet::new(category, features))
}
