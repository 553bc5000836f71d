//! Perceptual-model-to-Feature projection.
//!
//! Turns a fully resolved [`PerceptualModelBundle`] into a GeoJSON Feature:
//! the location's stored WKB becomes the geometry, the model's own columns
//! become top-level properties, and each related entity nests under a key
//! named after the relation. Optional relations that are absent are omitted
//! from the properties bag rather than emitted as nulls.

use serde_json::{Map, Value};

use hydromap_core::{Error, PerceptualModelBundle, Result};

use crate::geojson::{Feature, FeatureCollection, GeoJsonGeometry};
use crate::wkb;

/// Project one bundle into a GeoJSON Feature.
///
/// A location without stored geometry is a data-integrity failure; decoding
/// is exact, so repeated calls over the same bundle produce identical
/// coordinates.
pub fn project_feature(bundle: &PerceptualModelBundle) -> Result<Feature> {
    let bytes = bundle
        .location
        .pt
        .as_deref()
        .filter(|b| !b.is_empty())
        .ok_or_else(|| {
            Error::DataIntegrity(format!(
                "location {} of perceptual model {} has no geometry",
                bundle.location.id, bundle.model.id
            ))
        })?;

    let decoded = wkb::decode(bytes).map_err(|e| {
        Error::Geometry(format!(
            "location {} of perceptual model {}: {}",
            bundle.location.id, bundle.model.id, e
        ))
    })?;

    Ok(Feature::new(
        GeoJsonGeometry::from(decoded.geometry),
        feature_properties(bundle)?,
    ))
}

/// Project a set of bundles into a FeatureCollection.
///
/// All-or-nothing: any bundle that fails to project fails the whole
/// collection.
pub fn project_collection(bundles: &[PerceptualModelBundle]) -> Result<FeatureCollection> {
    let features = bundles
        .iter()
        .map(project_feature)
        .collect::<Result<Vec<_>>>()?;
    Ok(FeatureCollection::new(features))
}

/// Flatten the model's scalar columns and nest each related entity under a
/// key named after the relation.
fn feature_properties(bundle: &PerceptualModelBundle) -> Result<Map<String, Value>> {
    let mut properties = match serde_json::to_value(&bundle.model)? {
        Value::Object(map) => map,
        other => {
            return Err(Error::Internal(format!(
                "perceptual model serialized as non-object: {}",
                other
            )))
        }
    };

    properties.insert("citation".to_string(), serde_json::to_value(&bundle.citation)?);
    properties.insert(
        "process_taxonomies".to_string(),
        serde_json::to_value(&bundle.process_taxonomies)?,
    );
    properties.insert(
        "spatial_zone_type".to_string(),
        serde_json::to_value(&bundle.spatial_zone_type)?,
    );
    properties.insert(
        "temporal_zone_type".to_string(),
        serde_json::to_value(&bundle.temporal_zone_type)?,
    );
    if let Some(model_type) = &bundle.model_type {
        properties.insert("model_type".to_string(), serde_json::to_value(model_type)?);
    }

    Ok(properties)
}
