//! PostgreSQL implementation of TaxonomyRepository.
//!
//! Serves the lookup tables behind `/process_taxonomy/`, the zone routers,
//! and the `/filters/*` endpoints.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use hydromap_core::{
    Error, FunctionType, ProcessAltName, ProcessTaxonomy, ProcessTaxonomyEntry, Result,
    SpatialZoneType, TaxonomyRepository, TemporalZoneType,
};

#[derive(Clone)]
pub struct PgTaxonomyRepository {
    pool: Pool<Postgres>,
}

impl PgTaxonomyRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaxonomyRepository for PgTaxonomyRepository {
    async fn list(&self) -> Result<Vec<ProcessTaxonomyEntry>> {
        let rows = sqlx::query(
            "SELECT pt.id, pt.process, pt.identifier, pt.process_level, pt.function_id, \
                    ft.name AS function_name \
             FROM process_taxonomy pt \
             LEFT JOIN function_type ft ON ft.id = pt.function_id \
             ORDER BY pt.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let alt_names = sqlx::query_as::<_, ProcessAltName>(
            "SELECT id, process_id, alternative_names FROM process_alt_name ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut alt_by_process: HashMap<i32, Vec<ProcessAltName>> = HashMap::new();
        for alt in alt_names {
            if let Some(process_id) = alt.process_id {
                alt_by_process.entry(process_id).or_default().push(alt);
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let id: i32 = row.get("id");
                let function_id: Option<i32> = row.get("function_id");
                ProcessTaxonomyEntry {
                    taxonomy: ProcessTaxonomy {
                        id,
                        process: row.get("process"),
                        identifier: row.get("identifier"),
                        process_level: row.get("process_level"),
                        function_id,
                    },
                    function_type: function_id.map(|fid| FunctionType {
                        id: fid,
                        name: row.get("function_name"),
                    }),
                    process_alt_names: alt_by_process.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }

    async fn list_spatial_zones(&self) -> Result<Vec<SpatialZoneType>> {
        sqlx::query_as::<_, SpatialZoneType>(
            "SELECT id, spatial_property FROM spatial_zone_type ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn list_temporal_zones(&self) -> Result<Vec<TemporalZoneType>> {
        sqlx::query_as::<_, TemporalZoneType>(
            "SELECT id, temporal_property FROM temporal_zone_type ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }
}
