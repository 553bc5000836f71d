//! Core data models for hydromap.
//!
//! These types are shared across all hydromap crates and represent the
//! catalog's domain entities. The dataset is loaded out-of-band; the API
//! treats every entity as immutable.

use serde::{Deserialize, Serialize};

// =============================================================================
// CATALOG ENTITIES
// =============================================================================

/// Central fact record: one documented perceptual model of how water moves
/// through a specific landscape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct PerceptualModel {
    pub id: i32,
    pub figure_num: Option<String>,
    pub figure_url: Option<String>,
    pub figure_caption: Option<String>,
    pub textmodel_snipped: Option<String>,
    pub textmodel_section_number: Option<String>,
    pub textmodel_page_number: Option<String>,
    pub textmodel_section_name: Option<String>,
    pub num_spatial_zones: Option<i32>,
    pub num_temporal_zones: Option<String>,
    pub vegetation_info: Option<String>,
    pub soil_info: Option<String>,
    pub geol_info: Option<String>,
    pub topo_info: Option<String>,
    pub three_d_info: Option<String>,
    pub uncertainty_info: Option<String>,
    pub other_info: Option<String>,
    pub location_id: i32,
    pub citation_id: i32,
    pub spatialzone_id: i32,
    pub temporalzone_id: i32,
    pub model_type_id: Option<i32>,
}

/// Study site of a perceptual model. Owns the point geometry used by the
/// GeoJSON projection; `pt` holds the raw WKB bytes and never leaves the
/// server as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct Location {
    pub id: i32,
    pub name: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub area_km2: Option<f64>,
    pub huc_watershed_id: Option<i64>,
    #[serde(skip)]
    pub pt: Option<Vec<u8>>,
}

/// Bibliographic source backing a perceptual model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct Citation {
    pub id: i32,
    pub citation: Option<String>,
    pub url: Option<String>,
    pub attribution: Option<String>,
    pub attribution_url: Option<String>,
}

/// Controlled-vocabulary entry naming a hydrological process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct ProcessTaxonomy {
    pub id: i32,
    pub process: Option<String>,
    pub identifier: Option<String>,
    pub process_level: Option<f64>,
    pub function_id: Option<i32>,
}

/// Alternative naming for a process taxonomy entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct ProcessAltName {
    pub id: i32,
    pub process_id: Option<i32>,
    pub alternative_names: String,
}

/// Spatial-scale category tag for perceptual models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct SpatialZoneType {
    pub id: i32,
    pub spatial_property: Option<String>,
}

/// Temporal-scale category tag for perceptual models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct TemporalZoneType {
    pub id: i32,
    pub temporal_property: Option<String>,
}

/// Model classification category (e.g. "Infiltration").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct ModelType {
    pub id: i32,
    pub name: Option<String>,
}

/// Category owning a group of process taxonomy entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct FunctionType {
    pub id: i32,
    pub name: Option<String>,
}

/// A process taxonomy entry as linked to a specific perceptual model.
///
/// The association between perceptual models and process taxonomies is an
/// explicit entity carrying its own `original_text` annotation (the phrase
/// from the source literature that motivated the link), so the link rows are
/// never collapsed into a bare id pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LinkedProcessTaxonomy {
    #[serde(flatten)]
    pub taxonomy: ProcessTaxonomy,
    pub original_text: Option<String>,
}

/// A process taxonomy entry as listed by the catalog: the entry itself plus
/// its owning function category and any alternative names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProcessTaxonomyEntry {
    #[serde(flatten)]
    pub taxonomy: ProcessTaxonomy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_type: Option<FunctionType>,
    pub process_alt_names: Vec<ProcessAltName>,
}

// =============================================================================
// AGGREGATE VIEWS
// =============================================================================

/// A perceptual model with every relation resolved.
///
/// This is the unit the GeoJSON projection and the recursive endpoints
/// operate on: one fetch, no lazy loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PerceptualModelBundle {
    #[serde(flatten)]
    pub model: PerceptualModel,
    pub location: Location,
    pub citation: Citation,
    pub spatial_zone_type: SpatialZoneType,
    pub temporal_zone_type: TemporalZoneType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<ModelType>,
    pub process_taxonomies: Vec<LinkedProcessTaxonomy>,
}

// =============================================================================
// STATISTICS TYPES
// =============================================================================

/// Filter sets for the per-model-type count aggregation.
///
/// An absent or empty set means "do not filter on this dimension". Filter ids
/// are set-membership tests, not existence checks; unknown ids match nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ModelTypeCountRequest {
    #[serde(default)]
    pub spatialzone_ids: Option<Vec<i32>>,
    #[serde(default)]
    pub temporalzone_ids: Option<Vec<i32>>,
    #[serde(default)]
    pub process_taxonomy_ids: Option<Vec<i32>>,
}

impl ModelTypeCountRequest {
    /// True when no dimension is filtered.
    pub fn is_unfiltered(&self) -> bool {
        fn empty(ids: &Option<Vec<i32>>) -> bool {
            ids.as_ref().map_or(true, |v| v.is_empty())
        }
        empty(&self.spatialzone_ids)
            && empty(&self.temporalzone_ids)
            && empty(&self.process_taxonomy_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_request_default_is_unfiltered() {
        assert!(ModelTypeCountRequest::default().is_unfiltered());
    }

    #[test]
    fn test_count_request_empty_vec_is_unfiltered() {
        let req = ModelTypeCountRequest {
            spatialzone_ids: Some(vec![]),
            temporalzone_ids: None,
            process_taxonomy_ids: Some(vec![]),
        };
        assert!(req.is_unfiltered());
    }

    #[test]
    fn test_count_request_with_ids_is_filtered() {
        let req = ModelTypeCountRequest {
            spatialzone_ids: Some(vec![5]),
            ..Default::default()
        };
        assert!(!req.is_unfiltered());
    }

    #[test]
    fn test_count_request_deserializes_missing_fields() {
        let req: ModelTypeCountRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_unfiltered());

        let req: ModelTypeCountRequest =
            serde_json::from_str(r#"{"spatialzone_ids": [1, 2]}"#).unwrap();
        assert_eq!(req.spatialzone_ids, Some(vec![1, 2]));
        assert!(req.temporalzone_ids.is_none());
    }

    #[test]
    fn test_location_geometry_bytes_not_serialized() {
        let location = Location {
            id: 1,
            name: Some("Maimai".to_string()),
            country: Some("New Zealand".to_string()),
            lat: Some(-42.08),
            lon: Some(171.8),
            area_km2: Some(0.038),
            huc_watershed_id: None,
            pt: Some(vec![0x01, 0x01, 0x00, 0x00, 0x00]),
        };
        let json = serde_json::to_value(&location).unwrap();
        assert!(json.get("pt").is_none());
        assert_eq!(json["name"], "Maimai");
    }

    #[test]
    fn test_linked_taxonomy_flattens_scalar_fields() {
        let linked = LinkedProcessTaxonomy {
            taxonomy: ProcessTaxonomy {
                id: 3,
                process: Some("macropore flow".to_string()),
                identifier: Some("B1".to_string()),
                process_level: Some(2.0),
                function_id: Some(1),
            },
            original_text: Some("rapid lateral flow through root channels".to_string()),
        };
        let json = serde_json::to_value(&linked).unwrap();
        assert_eq!(json["process"], "macropore flow");
        assert_eq!(
            json["original_text"],
            "rapid lateral flow through root channels"
        );
    }
}
