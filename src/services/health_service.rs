use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
}

pub struct HealthService {
    pool: PgPool,
}

impl HealthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The process is serving; the database may still be down.
    pub async fn check(&self) -> HealthStatus {
        let database = match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => "ok",
            Err(e) => {
                tracing::warn!("Health check database ping failed: {}", e);
                "unavailable"
            }
        };
        HealthStatus {
            status: "ok",
            database,
        }
    }
}
