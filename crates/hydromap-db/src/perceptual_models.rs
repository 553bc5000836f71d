//! PostgreSQL implementation of PerceptualModelRepository.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use hydromap_core::{
    Citation, Error, LinkedProcessTaxonomy, Location, ModelType, PerceptualModel,
    PerceptualModelBundle, PerceptualModelRepository, ProcessTaxonomy, Result, SpatialZoneType,
    TemporalZoneType,
};

/// Columns of `perceptual_model`, in declaration order.
const MODEL_COLUMNS: &str = "id, figure_num, figure_url, figure_caption, \
     textmodel_snipped, textmodel_section_number, textmodel_page_number, \
     textmodel_section_name, num_spatial_zones, num_temporal_zones, \
     vegetation_info, soil_info, geol_info, topo_info, three_d_info, \
     uncertainty_info, other_info, location_id, citation_id, spatialzone_id, \
     temporalzone_id, model_type_id";

#[derive(Clone)]
pub struct PgPerceptualModelRepository {
    pool: Pool<Postgres>,
}

impl PgPerceptualModelRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Fetch a model or fail with NotFound.
    async fn require(&self, id: i32) -> Result<PerceptualModel> {
        self.get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("perceptual model {} not found", id)))
    }

    async fn location_by_id(&self, id: i32) -> Result<Option<Location>> {
        sqlx::query_as::<_, Location>(
            "SELECT id, name, country, lat, lon, area_km2, huc_watershed_id, pt \
             FROM location WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn citation_by_id(&self, id: i32) -> Result<Option<Citation>> {
        sqlx::query_as::<_, Citation>(
            "SELECT id, citation, url, attribution, attribution_url \
             FROM citation WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn spatial_zone_by_id(&self, id: i32) -> Result<Option<SpatialZoneType>> {
        sqlx::query_as::<_, SpatialZoneType>(
            "SELECT id, spatial_property FROM spatial_zone_type WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn temporal_zone_by_id(&self, id: i32) -> Result<Option<TemporalZoneType>> {
        sqlx::query_as::<_, TemporalZoneType>(
            "SELECT id, temporal_property FROM temporal_zone_type WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn model_type_by_id(&self, id: i32) -> Result<Option<ModelType>> {
        sqlx::query_as::<_, ModelType>("SELECT id, name FROM model_type WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    /// Assemble the bundle for an already-fetched model.
    ///
    /// Required relations with dangling foreign keys are DataIntegrity errors,
    /// never silently absent.
    async fn bundle_for(&self, model: PerceptualModel) -> Result<PerceptualModelBundle> {
        let location = self.location_by_id(model.location_id).await?.ok_or_else(|| {
            Error::DataIntegrity(format!(
                "perceptual model {} references missing location {}",
                model.id, model.location_id
            ))
        })?;
        let citation = self.citation_by_id(model.citation_id).await?.ok_or_else(|| {
            Error::DataIntegrity(format!(
                "perceptual model {} references missing citation {}",
                model.id, model.citation_id
            ))
        })?;
        let spatial_zone_type = self
            .spatial_zone_by_id(model.spatialzone_id)
            .await?
            .ok_or_else(|| {
                Error::DataIntegrity(format!(
                    "perceptual model {} references missing spatial zone type {}",
                    model.id, model.spatialzone_id
                ))
            })?;
        let temporal_zone_type = self
            .temporal_zone_by_id(model.temporalzone_id)
            .await?
            .ok_or_else(|| {
                Error::DataIntegrity(format!(
                    "perceptual model {} references missing temporal zone type {}",
                    model.id, model.temporalzone_id
                ))
            })?;
        let model_type = match model.model_type_id {
            Some(type_id) => Some(self.model_type_by_id(type_id).await?.ok_or_else(|| {
                Error::DataIntegrity(format!(
                    "perceptual model {} references missing model type {}",
                    model.id, type_id
                ))
            })?),
            None => None,
        };
        let process_taxonomies = self.linked_taxonomies(model.id).await?;

        Ok(PerceptualModelBundle {
            model,
            location,
            citation,
            spatial_zone_type,
            temporal_zone_type,
            model_type,
            process_taxonomies,
        })
    }

    /// Linked taxonomies for one model, annotation included.
    async fn linked_taxonomies(&self, model_id: i32) -> Result<Vec<LinkedProcessTaxonomy>> {
        let rows = sqlx::query(
            "SELECT pt.id, pt.process, pt.identifier, pt.process_level, pt.function_id, \
                    lpp.original_text \
             FROM link_process_perceptual lpp \
             JOIN process_taxonomy pt ON pt.id = lpp.process_id \
             WHERE lpp.entry_id = $1 \
             ORDER BY pt.id",
        )
        .bind(model_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|row| linked_taxonomy_from_row(&row)).collect())
    }
}

fn linked_taxonomy_from_row(row: &sqlx::postgres::PgRow) -> LinkedProcessTaxonomy {
    LinkedProcessTaxonomy {
        taxonomy: ProcessTaxonomy {
            id: row.get("id"),
            process: row.get("process"),
            identifier: row.get("identifier"),
            process_level: row.get("process_level"),
            function_id: row.get("function_id"),
        },
        original_text: row.get("original_text"),
    }
}

#[async_trait]
impl PerceptualModelRepository for PgPerceptualModelRepository {
    async fn list(&self) -> Result<Vec<PerceptualModel>> {
        sqlx::query_as::<_, PerceptualModel>(&format!(
            "SELECT {} FROM perceptual_model ORDER BY id",
            MODEL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn get(&self, id: i32) -> Result<Option<PerceptualModel>> {
        sqlx::query_as::<_, PerceptualModel>(&format!(
            "SELECT {} FROM perceptual_model WHERE id = $1",
            MODEL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn location(&self, id: i32) -> Result<Option<Location>> {
        let model = self.require(id).await?;
        match self.location_by_id(model.location_id).await? {
            Some(location) => Ok(Some(location)),
            None => Err(Error::DataIntegrity(format!(
                "perceptual model {} references missing location {}",
                id, model.location_id
            ))),
        }
    }

    async fn citation(&self, id: i32) -> Result<Option<Citation>> {
        let model = self.require(id).await?;
        match self.citation_by_id(model.citation_id).await? {
            Some(citation) => Ok(Some(citation)),
            None => Err(Error::DataIntegrity(format!(
                "perceptual model {} references missing citation {}",
                id, model.citation_id
            ))),
        }
    }

    async fn spatial_zone_type(&self, id: i32) -> Result<Option<SpatialZoneType>> {
        let model = self.require(id).await?;
        match self.spatial_zone_by_id(model.spatialzone_id).await? {
            Some(zone) => Ok(Some(zone)),
            None => Err(Error::DataIntegrity(format!(
                "perceptual model {} references missing spatial zone type {}",
                id, model.spatialzone_id
            ))),
        }
    }

    async fn temporal_zone_type(&self, id: i32) -> Result<Option<TemporalZoneType>> {
        let model = self.require(id).await?;
        match self.temporal_zone_by_id(model.temporalzone_id).await? {
            Some(zone) => Ok(Some(zone)),
            None => Err(Error::DataIntegrity(format!(
                "perceptual model {} references missing temporal zone type {}",
                id, model.temporalzone_id
            ))),
        }
    }

    async fn model_type(&self, id: i32) -> Result<Option<ModelType>> {
        let model = self.require(id).await?;
        match model.model_type_id {
            Some(type_id) => match self.model_type_by_id(type_id).await? {
                Some(model_type) => Ok(Some(model_type)),
                None => Err(Error::DataIntegrity(format!(
                    "perceptual model {} references missing model type {}",
                    id, type_id
                ))),
            },
            None => Ok(None),
        }
    }

    async fn process_taxonomies(&self, id: i32) -> Result<Vec<LinkedProcessTaxonomy>> {
        self.require(id).await?;
        self.linked_taxonomies(id).await
    }

    async fn get_bundle(&self, id: i32) -> Result<Option<PerceptualModelBundle>> {
        match self.get(id).await? {
            Some(model) => Ok(Some(self.bundle_for(model).await?)),
            None => Ok(None),
        }
    }

    async fn list_bundles(&self) -> Result<Vec<PerceptualModelBundle>> {
        let models = self.list().await?;
        if models.is_empty() {
            return Ok(Vec::new());
        }

        // Batch the relation fetches: one query per table instead of one
        // round trip per model.
        let location_ids: Vec<i32> = models.iter().map(|m| m.location_id).collect();
        let citation_ids: Vec<i32> = models.iter().map(|m| m.citation_id).collect();

        let locations: HashMap<i32, Location> = sqlx::query_as::<_, Location>(
            "SELECT id, name, country, lat, lon, area_km2, huc_watershed_id, pt \
             FROM location WHERE id = ANY($1)",
        )
        .bind(&location_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?
        .into_iter()
        .map(|l| (l.id, l))
        .collect();

        let citations: HashMap<i32, Citation> = sqlx::query_as::<_, Citation>(
            "SELECT id, citation, url, attribution, attribution_url \
             FROM citation WHERE id = ANY($1)",
        )
        .bind(&citation_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

        let spatial_zones: HashMap<i32, SpatialZoneType> =
            sqlx::query_as::<_, SpatialZoneType>(
                "SELECT id, spatial_property FROM spatial_zone_type",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?
            .into_iter()
            .map(|z| (z.id, z))
            .collect();

        let temporal_zones: HashMap<i32, TemporalZoneType> =
            sqlx::query_as::<_, TemporalZoneType>(
                "SELECT id, temporal_property FROM temporal_zone_type",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?
            .into_iter()
            .map(|z| (z.id, z))
            .collect();

        let model_types: HashMap<i32, ModelType> =
            sqlx::query_as::<_, ModelType>("SELECT id, name FROM model_type")
                .fetch_all(&self.pool)
                .await
                .map_err(Error::Database)?
                .into_iter()
                .map(|t| (t.id, t))
                .collect();

        let model_ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let link_rows = sqlx::query(
            "SELECT lpp.entry_id, pt.id, pt.process, pt.identifier, pt.process_level, \
                    pt.function_id, lpp.original_text \
             FROM link_process_perceptual lpp \
             JOIN process_taxonomy pt ON pt.id = lpp.process_id \
             WHERE lpp.entry_id = ANY($1) \
             ORDER BY lpp.entry_id, pt.id",
        )
        .bind(&model_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut taxonomies_by_model: HashMap<i32, Vec<LinkedProcessTaxonomy>> = HashMap::new();
        for row in &link_rows {
            let entry_id: i32 = row.get("entry_id");
            taxonomies_by_model
                .entry(entry_id)
                .or_default()
                .push(linked_taxonomy_from_row(row));
        }

        let mut bundles = Vec::with_capacity(models.len());
        for model in models {
            let location = locations.get(&model.location_id).cloned().ok_or_else(|| {
                Error::DataIntegrity(format!(
                    "perceptual model {} references missing location {}",
                    model.id, model.location_id
                ))
            })?;
            let citation = citations.get(&model.citation_id).cloned().ok_or_else(|| {
                Error::DataIntegrity(format!(
                    "perceptual model {} references missing citation {}",
                    model.id, model.citation_id
                ))
            })?;
            let spatial_zone_type =
                spatial_zones.get(&model.spatialzone_id).cloned().ok_or_else(|| {
                    Error::DataIntegrity(format!(
                        "perceptual model {} references missing spatial zone type {}",
                        model.id, model.spatialzone_id
                    ))
                })?;
            let temporal_zone_type = temporal_zones
                .get(&model.temporalzone_id)
                .cloned()
                .ok_or_else(|| {
                    Error::DataIntegrity(format!(
                        "perceptual model {} references missing temporal zone type {}",
                        model.id, model.temporalzone_id
                    ))
                })?;
            let model_type = match model.model_type_id {
                Some(type_id) => Some(model_types.get(&type_id).cloned().ok_or_else(|| {
                    Error::DataIntegrity(format!(
                        "perceptual model {} references missing model type {}",
                        model.id, type_id
                    ))
                })?),
                None => None,
            };
            let process_taxonomies = taxonomies_by_model.remove(&model.id).unwrap_or_default();

            bundles.push(PerceptualModelBundle {
                model,
                location,
                citation,
                spatial_zone_type,
                temporal_zone_type,
                model_type,
                process_taxonomies,
            });
        }
        Ok(bundles)
    }
}
