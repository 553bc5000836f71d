//! Lookup-table HTTP handlers.
//!
//! The process taxonomy and zone types are served both at their own routers
//! (`/process_taxonomy/`, `/spatial_zone/`, `/temporal_zone/`) and under
//! `/filters/*` for the visualization client's filter pickers. Both mounts
//! share these handlers.

use axum::{extract::State, Json};

use crate::{ApiError, AppState};
use hydromap_core::{
    ProcessTaxonomyEntry, SpatialZoneType, TaxonomyRepository, TemporalZoneType,
};

/// List all process taxonomy entries.
#[utoipa::path(
    get,
    path = "/process_taxonomy/",
    tag = "Lookups",
    responses((status = 200, body = [ProcessTaxonomyEntry]))
)]
pub async fn list_process_taxonomies(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProcessTaxonomyEntry>>, ApiError> {
    Ok(Json(state.db.taxonomy.list().await?))
}

/// List all spatial zone types.
#[utoipa::path(
    get,
    path = "/spatial_zone/",
    tag = "Lookups",
    responses((status = 200, body = [SpatialZoneType]))
)]
pub async fn list_spatial_zones(
    State(state): State<AppState>,
) -> Result<Json<Vec<SpatialZoneType>>, ApiError> {
    Ok(Json(state.db.taxonomy.list_spatial_zones().await?))
}

/// List all temporal zone types.
#[utoipa::path(
    get,
    path = "/temporal_zone/",
    tag = "Lookups",
    responses((status = 200, body = [TemporalZoneType]))
)]
pub async fn list_temporal_zones(
    State(state): State<AppState>,
) -> Result<Json<Vec<TemporalZoneType>>, ApiError> {
    Ok(Json(state.db.taxonomy.list_temporal_zones().await?))
}
