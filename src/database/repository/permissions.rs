use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::Permission;

pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn all(&self) -> Result<Vec<Permission>, DatabaseError> {
        let permissions = sqlx::query_as::<_, Permission>("SELECT id, name FROM permissions ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(permissions)
    }

    pub async fn create(&self, name: &str) -> Result<Permission, DatabaseError> {
        sqlx::query_as::<_, Permission>("INSERT INTO permissions (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::classify)
    }

    /// Insert if missing, otherwise return the existing row
    pub async fn ensure(&self, name: &str) -> Result<Permission, DatabaseError> {
        let permission = sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(permission)
    }
}
