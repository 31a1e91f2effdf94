use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Map constraint violations onto client-meaningful variants
    pub fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DatabaseError::Conflict(
                    Self::constraint_message(db_err.constraint(), "already exists"),
                );
            }
            if db_err.is_foreign_key_violation() {
                return DatabaseError::InvalidReference(
                    Self::constraint_message(db_err.constraint(), "references a missing record"),
                );
            }
        }
        DatabaseError::Sqlx(err)
    }

    fn constraint_message(constraint: Option<&str>, suffix: &str) -> String {
        match constraint {
            Some(name) => format!("{} {}", name, suffix),
            None => format!("record {}", suffix),
        }
    }
}

/// Build the application pool. Connections are opened on first use, so the
/// server can start (and report a degraded /health) while the database is down.
pub fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect_lazy(&config.url)?;

    info!("Configured database pool (max {} connections)", config.max_connections);
    Ok(pool)
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
