//! Data model for safe walking routes
//!
//! Contains the street network and the municipal features analysed
//! around computed routes.

pub mod features;
pub mod streets;

pub use features::{Feature, FeatureCategory, FeatureSet};
pub use streets::{EdgeAttributes, NodeIndex, StreetEdge, StreetGraph, StreetNode};
