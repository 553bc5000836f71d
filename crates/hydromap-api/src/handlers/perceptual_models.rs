//! Perceptual model HTTP handlers.
//!
//! Flat listings, per-relation getters, the recursive (fully nested) views,
//! and the GeoJSON projection endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{ApiError, AppState};
use hydromap_core::{
    Citation, LinkedProcessTaxonomy, Location, ModelType, PerceptualModel, PerceptualModelBundle,
    PerceptualModelRepository, SpatialZoneType, TemporalZoneType,
};
use hydromap_geo::{project_collection, project_feature, Feature, FeatureCollection};

/// List all perceptual models (flat rows, no relations).
#[utoipa::path(
    get,
    path = "/perceptual_model/",
    tag = "Perceptual models",
    responses((status = 200, body = [PerceptualModel]))
)]
pub async fn list_perceptual_models(
    State(state): State<AppState>,
) -> Result<Json<Vec<PerceptualModel>>, ApiError> {
    Ok(Json(state.db.perceptual_models.list().await?))
}

/// Get a perceptual model by id.
#[utoipa::path(
    get,
    path = "/perceptual_model/{id}",
    tag = "Perceptual models",
    params(("id" = i32, Path, description = "Perceptual model id")),
    responses(
        (status = 200, body = PerceptualModel),
        (status = 404, description = "No perceptual model with this id")
    )
)]
pub async fn get_perceptual_model(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PerceptualModel>, ApiError> {
    let model = state
        .db
        .perceptual_models
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("perceptual model {} not found", id)))?;
    Ok(Json(model))
}

/// List all perceptual models with their nested relations.
#[utoipa::path(
    get,
    path = "/perceptual_model/recursive",
    tag = "Perceptual models",
    responses((status = 200, body = [PerceptualModelBundle]))
)]
pub async fn list_perceptual_models_recursive(
    State(state): State<AppState>,
) -> Result<Json<Vec<PerceptualModelBundle>>, ApiError> {
    Ok(Json(state.db.perceptual_models.list_bundles().await?))
}

/// Get a perceptual model by id with its nested relations.
#[utoipa::path(
    get,
    path = "/perceptual_model/recursive/{id}",
    tag = "Perceptual models",
    params(("id" = i32, Path, description = "Perceptual model id")),
    responses(
        (status = 200, body = PerceptualModelBundle),
        (status = 404, description = "No perceptual model with this id")
    )
)]
pub async fn get_perceptual_model_recursive(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PerceptualModelBundle>, ApiError> {
    let bundle = state
        .db
        .perceptual_models
        .get_bundle(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("perceptual model {} not found", id)))?;
    Ok(Json(bundle))
}

/// All perceptual models as a GeoJSON FeatureCollection.
#[utoipa::path(
    get,
    path = "/perceptual_model/geojson",
    tag = "Perceptual models",
    responses((status = 200, body = FeatureCollection))
)]
pub async fn perceptual_models_geojson(
    State(state): State<AppState>,
) -> Result<Json<FeatureCollection>, ApiError> {
    let bundles = state.db.perceptual_models.list_bundles().await?;
    Ok(Json(project_collection(&bundles)?))
}

/// One perceptual model as a GeoJSON Feature.
#[utoipa::path(
    get,
    path = "/perceptual_model/geojson/{id}",
    tag = "Perceptual models",
    params(("id" = i32, Path, description = "Perceptual model id")),
    responses(
        (status = 200, body = Feature),
        (status = 404, description = "No perceptual model with this id"),
        (status = 422, description = "The model's location has no decodable geometry")
    )
)]
pub async fn perceptual_model_geojson(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Feature>, ApiError> {
    let bundle = state
        .db
        .perceptual_models
        .get_bundle(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("perceptual model {} not found", id)))?;
    Ok(Json(project_feature(&bundle)?))
}

/// Get the location for a perceptual model.
#[utoipa::path(
    get,
    path = "/perceptual_model/{id}/location",
    tag = "Perceptual models",
    params(("id" = i32, Path, description = "Perceptual model id")),
    responses(
        (status = 200, body = Location),
        (status = 404, description = "No perceptual model with this id")
    )
)]
pub async fn get_perceptual_model_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Option<Location>>, ApiError> {
    Ok(Json(state.db.perceptual_models.location(id).await?))
}

/// Get the citation for a perceptual model.
#[utoipa::path(
    get,
    path = "/perceptual_model/{id}/citation",
    tag = "Perceptual models",
    params(("id" = i32, Path, description = "Perceptual model id")),
    responses(
        (status = 200, body = Citation),
        (status = 404, description = "No perceptual model with this id")
    )
)]
pub async fn get_perceptual_model_citation(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Option<Citation>>, ApiError> {
    Ok(Json(state.db.perceptual_models.citation(id).await?))
}

/// Get the spatial zone type for a perceptual model.
#[utoipa::path(
    get,
    path = "/perceptual_model/{id}/spatial_zone_type",
    tag = "Perceptual models",
    params(("id" = i32, Path, description = "Perceptual model id")),
    responses(
        (status = 200, body = SpatialZoneType),
        (status = 404, description = "No perceptual model with this id")
    )
)]
pub async fn get_perceptual_model_spatial_zone_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Option<SpatialZoneType>>, ApiError> {
    Ok(Json(state.db.perceptual_models.spatial_zone_type(id).await?))
}

/// Get the temporal zone type for a perceptual model.
#[utoipa::path(
    get,
    path = "/perceptual_model/{id}/temporal_zone_type",
    tag = "Perceptual models",
    params(("id" = i32, Path, description = "Perceptual model id")),
    responses(
        (status = 200, body = TemporalZoneType),
        (status = 404, description = "No perceptual model with this id")
    )
)]
pub async fn get_perceptual_model_temporal_zone_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Option<TemporalZoneType>>, ApiError> {
    Ok(Json(state.db.perceptual_models.temporal_zone_type(id).await?))
}

/// Get the model type for a perceptual model; null when the model has none.
#[utoipa::path(
    get,
    path = "/perceptual_model/{id}/model_type",
    tag = "Perceptual models",
    params(("id" = i32, Path, description = "Perceptual model id")),
    responses(
        (status = 200, body = ModelType, description = "The model type, or null when the model has none"),
        (status = 404, description = "No perceptual model with this id")
    )
)]
pub async fn get_perceptual_model_model_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Option<ModelType>>, ApiError> {
    Ok(Json(state.db.perceptual_models.model_type(id).await?))
}

/// Get the process taxonomies linked to a perceptual model.
#[utoipa::path(
    get,
    path = "/perceptual_model/{id}/process_taxonomies",
    tag = "Perceptual models",
    params(("id" = i32, Path, description = "Perceptual model id")),
    responses(
        (status = 200, body = [LinkedProcessTaxonomy]),
        (status = 404, description = "No perceptual model with this id")
    )
)]
pub async fn get_perceptual_model_process_taxonomies(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<LinkedProcessTaxonomy>>, ApiError> {
    Ok(Json(state.db.perceptual_models.process_taxonomies(id).await?))
}
