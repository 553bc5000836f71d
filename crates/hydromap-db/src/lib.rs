//! # hydromap-db
//!
//! PostgreSQL database layer for the hydromap catalog.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for the catalog entities
//! - The filtered per-model-type count aggregation
//!
//! ## Example
//!
//! ```rust,ignore
//! use hydromap_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/hydromap").await?;
//!     let total = db.statistics.model_count().await?;
//!     println!("{} perceptual models", total);
//!     Ok(())
//! }
//! ```

pub mod perceptual_models;
pub mod pool;
pub mod statistics;
pub mod taxonomy;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use hydromap_core::*;

// Re-export repository implementations
pub use perceptual_models::PgPerceptualModelRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use statistics::PgStatisticsRepository;
pub use taxonomy::PgTaxonomyRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Perceptual model reads, relation getters, and bundle assembly.
    pub perceptual_models: PgPerceptualModelRepository,
    /// Process taxonomy and zone lookup tables.
    pub taxonomy: PgTaxonomyRepository,
    /// Counting and statistics queries.
    pub statistics: PgStatisticsRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            perceptual_models: PgPerceptualModelRepository::new(pool.clone()),
            taxonomy: PgTaxonomyRepository::new(pool.clone()),
            statistics: PgStatisticsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
