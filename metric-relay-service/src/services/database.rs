//! Record store for metric-relay-service.

use crate::config::DatabaseConfig;
use crate::models::Metric;
use crate::services::metrics::record_db_query;
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Point lookups against the metric store. The relay never writes.
#[async_trait]
pub trait MetricStore: Send + Sync {
    async fn find_metric(&self, metric_id: i32) -> Result<Option<Metric>, AppError>;
    async fn health_check(&self) -> Result<(), AppError>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct MetricDb {
    pool: PgPool,
}

impl MetricDb {
    /// Create a new connection pool.
    #[instrument(skip(config), fields(service = "metric-relay-service"))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(600))
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MetricStore for MetricDb {
    #[instrument(skip(self))]
    async fn find_metric(&self, metric_id: i32) -> Result<Option<Metric>, AppError> {
        let started = Instant::now();

        let metric = sqlx::query_as::<_, Metric>(
            r#"
            SELECT id, "type", name, payload, created_at
            FROM metrics
            WHERE id = $1
            "#,
        )
        .bind(metric_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!(
                "Failed to load metric {}: {}",
                metric_id,
                e
            ))
        })?;

        record_db_query("find_metric", started.elapsed());

        Ok(metric)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }
}
