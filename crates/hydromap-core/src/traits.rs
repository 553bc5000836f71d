//! Core traits for hydromap abstractions.
//!
//! These traits define the read-side interfaces the concrete PostgreSQL
//! implementations satisfy, keeping handlers testable against fakes.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::config::NullModelTypePolicy;
use crate::error::Result;
use crate::models::*;

/// Repository for perceptual model reads.
///
/// Relation getters resolve the model first: a missing model id is a
/// `NotFound` error, while a model whose optional relation is absent yields
/// `Ok(None)`.
#[async_trait]
pub trait PerceptualModelRepository: Send + Sync {
    /// List all perceptual models (flat rows, no relations).
    async fn list(&self) -> Result<Vec<PerceptualModel>>;

    /// Fetch a single perceptual model by id.
    async fn get(&self, id: i32) -> Result<Option<PerceptualModel>>;

    /// Fetch the location of a model.
    async fn location(&self, id: i32) -> Result<Option<Location>>;

    /// Fetch the citation of a model.
    async fn citation(&self, id: i32) -> Result<Option<Citation>>;

    /// Fetch the spatial zone type of a model.
    async fn spatial_zone_type(&self, id: i32) -> Result<Option<SpatialZoneType>>;

    /// Fetch the temporal zone type of a model.
    async fn temporal_zone_type(&self, id: i32) -> Result<Option<TemporalZoneType>>;

    /// Fetch the model type of a model, if it has one.
    async fn model_type(&self, id: i32) -> Result<Option<ModelType>>;

    /// Fetch the process taxonomies linked to a model, with the per-link
    /// `original_text` annotations.
    async fn process_taxonomies(&self, id: i32) -> Result<Vec<LinkedProcessTaxonomy>>;

    /// Fetch a model with every relation resolved.
    async fn get_bundle(&self, id: i32) -> Result<Option<PerceptualModelBundle>>;

    /// Fetch all models with every relation resolved.
    async fn list_bundles(&self) -> Result<Vec<PerceptualModelBundle>>;
}

/// Repository for the taxonomy and zone lookup tables.
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// List all process taxonomy entries with their function category and
    /// alternative names.
    async fn list(&self) -> Result<Vec<ProcessTaxonomyEntry>>;

    /// List all spatial zone types.
    async fn list_spatial_zones(&self) -> Result<Vec<SpatialZoneType>>;

    /// List all temporal zone types.
    async fn list_temporal_zones(&self) -> Result<Vec<TemporalZoneType>>;
}

/// Repository for the counting/statistics queries.
#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// Count perceptual models per model-type category under the given
    /// filters. Every known category appears in the map, zero-count
    /// categories included; the policy decides whether models without a
    /// model type contribute a synthetic bucket.
    async fn model_type_counts(
        &self,
        req: &ModelTypeCountRequest,
        policy: &NullModelTypePolicy,
    ) -> Result<HashMap<String, i64>>;

    /// Unfiltered total count of perceptual models.
    async fn model_count(&self) -> Result<i64>;
}
