//! PostgreSQL implementation of StatisticsRepository.
//!
//! The per-model-type count runs as a single grouped query rather than one
//! query per category: the three optional filter dimensions combine with AND,
//! membership within a dimension is OR, and the process-taxonomy dimension
//! goes through an EXISTS subquery on the link table so a model matching
//! several requested taxonomy ids is still counted once.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use hydromap_core::{
    Error, ModelTypeCountRequest, NullModelTypePolicy, Result, StatisticsRepository,
};

/// Filter clause composition for the grouped count query.
///
/// Produces the complete SQL plus the bind values in clause order. Empty or
/// absent id sets contribute no clause; unknown ids are set-membership misses,
/// not errors.
pub(crate) struct CountQueryBuilder<'a> {
    request: &'a ModelTypeCountRequest,
}

impl<'a> CountQueryBuilder<'a> {
    pub(crate) fn new(request: &'a ModelTypeCountRequest) -> Self {
        Self { request }
    }

    pub(crate) fn build(&self) -> (String, Vec<&'a Vec<i32>>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut binds: Vec<&'a Vec<i32>> = Vec::new();

        if let Some(ids) = non_empty(&self.request.spatialzone_ids) {
            binds.push(ids);
            clauses.push(format!("pm.spatialzone_id = ANY(${})", binds.len()));
        }
        if let Some(ids) = non_empty(&self.request.temporalzone_ids) {
            binds.push(ids);
            clauses.push(format!("pm.temporalzone_id = ANY(${})", binds.len()));
        }
        if let Some(ids) = non_empty(&self.request.process_taxonomy_ids) {
            binds.push(ids);
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM link_process_perceptual lpp \
                 WHERE lpp.entry_id = pm.id AND lpp.process_id = ANY(${}))",
                binds.len()
            ));
        }

        let mut sql = String::from(
            "SELECT pm.model_type_id, COUNT(*) AS model_count FROM perceptual_model pm",
        );
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" GROUP BY pm.model_type_id");

        (sql, binds)
    }
}

fn non_empty(ids: &Option<Vec<i32>>) -> Option<&Vec<i32>> {
    ids.as_ref().filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct PgStatisticsRepository {
    pool: Pool<Postgres>,
}

impl PgStatisticsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All model-type categories, keyed by id, name uniqueness verified.
    async fn category_names(&self) -> Result<HashMap<i32, String>> {
        let rows = sqlx::query("SELECT id, name FROM model_type ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let mut names: HashMap<i32, String> = HashMap::with_capacity(rows.len());
        let mut seen: HashMap<String, i32> = HashMap::with_capacity(rows.len());
        for row in rows {
            let id: i32 = row.get("id");
            let name: Option<String> = row.get("name");
            let name = name.ok_or_else(|| {
                Error::DataIntegrity(format!("model type {} has no name", id))
            })?;
            if let Some(first_id) = seen.insert(name.clone(), id) {
                return Err(Error::DataIntegrity(format!(
                    "duplicate model type name \"{}\" (ids {} and {})",
                    name, first_id, id
                )));
            }
            names.insert(id, name);
        }
        Ok(names)
    }
}

#[async_trait]
impl StatisticsRepository for PgStatisticsRepository {
    async fn model_type_counts(
        &self,
        req: &ModelTypeCountRequest,
        policy: &NullModelTypePolicy,
    ) -> Result<HashMap<String, i64>> {
        let names = self.category_names().await?;

        let (sql, binds) = CountQueryBuilder::new(req).build();
        let mut query = sqlx::query(&sql);
        for ids in binds {
            query = query.bind(ids);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(Error::Database)?;

        // Every known category reports, zero-count categories included.
        let mut counts: HashMap<String, i64> =
            names.values().map(|name| (name.clone(), 0)).collect();
        if let NullModelTypePolicy::Bucket { label } = policy {
            if counts.contains_key(label.as_str()) {
                return Err(Error::DataIntegrity(format!(
                    "null-model-type bucket label \"{}\" collides with an existing model type",
                    label
                )));
            }
            counts.insert(label.clone(), 0);
        }

        for row in rows {
            let type_id: Option<i32> = row.get("model_type_id");
            let count: i64 = row.get("model_count");
            match type_id {
                Some(id) => {
                    let name = names.get(&id).ok_or_else(|| {
                        Error::DataIntegrity(format!(
                            "perceptual models reference missing model type {}",
                            id
                        ))
                    })?;
                    counts.insert(name.clone(), count);
                }
                None => match policy {
                    NullModelTypePolicy::Bucket { label } => {
                        counts.insert(label.clone(), count);
                    }
                    NullModelTypePolicy::Drop => {}
                },
            }
        }
        Ok(counts)
    }

    async fn model_count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM perceptual_model")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        spatial: Option<Vec<i32>>,
        temporal: Option<Vec<i32>>,
        taxonomy: Option<Vec<i32>>,
    ) -> ModelTypeCountRequest {
        ModelTypeCountRequest {
            spatialzone_ids: spatial,
            temporalzone_ids: temporal,
            process_taxonomy_ids: taxonomy,
        }
    }

    #[test]
    fn test_unfiltered_query_has_no_where_clause() {
        let req = request(None, None, None);
        let (sql, binds) = CountQueryBuilder::new(&req).build();
        assert_eq!(
            sql,
            "SELECT pm.model_type_id, COUNT(*) AS model_count FROM perceptual_model pm \
             GROUP BY pm.model_type_id"
        );
        assert!(binds.is_empty());
    }

    #[test]
    fn test_empty_sets_are_treated_as_absent() {
        let req = request(Some(vec![]), Some(vec![]), Some(vec![]));
        let (sql, binds) = CountQueryBuilder::new(&req).build();
        assert!(!sql.contains("WHERE"));
        assert!(binds.is_empty());
    }

    #[test]
    fn test_spatial_filter_alone() {
        let req = request(Some(vec![5]), None, None);
        let (sql, binds) = CountQueryBuilder::new(&req).build();
        assert!(sql.contains("WHERE pm.spatialzone_id = ANY($1)"));
        assert!(!sql.contains("temporalzone_id"));
        assert!(!sql.contains("link_process_perceptual"));
        assert_eq!(binds, vec![&vec![5]]);
    }

    #[test]
    fn test_taxonomy_filter_uses_exists_subquery() {
        // EXISTS on the link table, never a join: a model linked to several
        // requested taxonomy ids must count once.
        let req = request(None, None, Some(vec![3, 4]));
        let (sql, binds) = CountQueryBuilder::new(&req).build();
        assert!(sql.contains(
            "EXISTS (SELECT 1 FROM link_process_perceptual lpp \
             WHERE lpp.entry_id = pm.id AND lpp.process_id = ANY($1))"
        ));
        assert_eq!(binds, vec![&vec![3, 4]]);
    }

    #[test]
    fn test_all_dimensions_combine_with_and() {
        let req = request(Some(vec![5]), Some(vec![2, 3]), Some(vec![7]));
        let (sql, binds) = CountQueryBuilder::new(&req).build();
        assert!(sql.contains("pm.spatialzone_id = ANY($1)"));
        assert!(sql.contains("AND pm.temporalzone_id = ANY($2)"));
        assert!(sql.contains("AND EXISTS"));
        assert!(sql.contains("lpp.process_id = ANY($3)"));
        assert_eq!(binds.len(), 3);
    }

    #[test]
    fn test_bind_indexes_shift_when_dimensions_are_skipped() {
        let req = request(None, Some(vec![2]), Some(vec![7]));
        let (sql, binds) = CountQueryBuilder::new(&req).build();
        assert!(sql.contains("pm.temporalzone_id = ANY($1)"));
        assert!(sql.contains("lpp.process_id = ANY($2)"));
        assert_eq!(binds, vec![&vec![2], &vec![7]]);
    }
}
