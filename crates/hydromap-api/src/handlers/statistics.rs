//! Statistics HTTP handlers.

use std::collections::HashMap;

use axum::{extract::State, Json};

use crate::{ApiError, AppState};
use hydromap_core::{ModelTypeCountRequest, StatisticsRepository};

/// Count perceptual models per model-type category.
///
/// The three filter dimensions combine with AND; membership within a
/// dimension is OR. An absent or empty id set leaves that dimension
/// unfiltered. The whole mapping is produced or the request fails; no
/// partial results.
#[utoipa::path(
    post,
    path = "/statistics/model_type_count",
    tag = "Statistics",
    request_body = ModelTypeCountRequest,
    responses(
        (status = 200, description = "Mapping from model type name to count"),
        (status = 422, description = "Category names are not unique")
    )
)]
pub async fn model_type_count(
    State(state): State<AppState>,
    Json(request): Json<ModelTypeCountRequest>,
) -> Result<Json<HashMap<String, i64>>, ApiError> {
    let counts = state
        .db
        .statistics
        .model_type_counts(&request, &state.null_model_type_policy)
        .await?;
    Ok(Json(counts))
}

/// Unfiltered total count of perceptual models.
#[utoipa::path(
    get,
    path = "/statistics/model_count",
    tag = "Statistics",
    responses((status = 200, body = i64))
)]
pub async fn model_count(State(state): State<AppState>) -> Result<Json<i64>, ApiError> {
    Ok(Json(state.db.statistics.model_count().await?))
}
