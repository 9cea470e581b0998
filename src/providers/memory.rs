use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hashbrown::HashMap;
use saferoute_core::model::{FeatureCategory, FeatureSet};

use super::geojson_source::feature_set_from_geojson_reader;
use super::{FeatureProvider, QueryEnvelope};
use crate::cancellation::RequestBudget;
use crate::error::FeatureQueryError;

/// Feature layers held in memory, queried by bounding box.
///
/// A category that was never loaded answers with an empty set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeatureProvider {
    layers: HashMap<FeatureCategory, FeatureSet>,
}

impl InMemoryFeatureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the layer of `set.category`
    pub fn insert(&mut self, set: FeatureSet) {
        self.layers.insert(set.category, set);
    }

    #[must_use]
    pub fn with_layer(mut self, set: FeatureSet) -> Self {
        self.insert(set);
        self
    }

    /// Loads a `GeoJSON` file (longitude/latitude) as the layer of `category`
    pub fn load_geojson(
        &mut self,
        category: FeatureCategory,
        path: impl AsRef<Path>,
    ) -> Result<(), FeatureQueryError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            FeatureQueryError::Unreachable(format!("{}: {e}", path.display()))
        })?;
        let set = feature_set_from_geojson_reader(category, BufReader::new(file))?;
        log::info!(
            "Loaded {} {} features from {}",
            set.len(),
            category,
            path.display()
        );
        self.insert(set);
        Ok(())
    }

    pub fn layer(&self, category: FeatureCategory) -> Option<&FeatureSet> {
        self.layers.get(&category)
    }
}

impl FromIterator<FeatureSet> for InMemoryFeatureProvider {
    fn from_iter<I: IntoIterator<Item = FeatureSet>>(iter: I) -> Self {
        let mut provider = Self::new();
        for set in iter {
            provider.insert(set);
        }
        provider
    }
}

impl FeatureProvider for InMemoryFeatureProvider {
    fn query(
        &self,
        category: FeatureCategory,
        envelope: &QueryEnvelope,
        budget: &RequestBudget,
    ) -> Result<FeatureSet, FeatureQueryError> {
        budget.check()?;
        Ok(self.layers.get(&category).map_or_else(
            || FeatureSet::empty(category),
            |set| set.within_envelope(&envelope.geographic),
        ))
    }
}
