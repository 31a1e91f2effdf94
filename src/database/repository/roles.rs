use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::expect_affected;
use crate::auth::permission::PermissionLookup;
use crate::database::manager::DatabaseError;
use crate::database::models::{Permission, Role};

pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn all(&self) -> Result<Vec<Role>, DatabaseError> {
        let roles = sqlx::query_as::<_, Role>("SELECT id, name FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let ids: Vec<i64> = roles.iter().map(|r| r.id).collect();
        let mut permissions = self.permissions_by_role(&ids).await?;

        Ok(roles
            .into_iter()
            .map(|mut role| {
                role.permissions = permissions.remove(&role.id).unwrap_or_default();
                role
            })
            .collect())
    }

    pub async fn find(&self, id: i64) -> Result<Option<Role>, DatabaseError> {
        Ok(self.load_many(&[id]).await?.remove(&id))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>, DatabaseError> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        match id {
            Some(id) => self.find(id).await,
            None => Ok(None),
        }
    }

    /// Roles keyed by id, permissions attached
    pub async fn load_many(&self, ids: &[i64]) -> Result<HashMap<i64, Role>, DatabaseError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let roles = sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        let mut permissions = self.permissions_by_role(ids).await?;

        Ok(roles
            .into_iter()
            .map(|mut role| {
                role.permissions = permissions.remove(&role.id).unwrap_or_default();
                (role.id, role)
            })
            .collect())
    }

    pub async fn create(&self, name: &str, permission_ids: &[i64]) -> Result<Role, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar("INSERT INTO roles (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&mut *tx)
            .await
            .map_err(DatabaseError::classify)?;
        assign_permissions(&mut tx, id, permission_ids).await?;

        tx.commit().await?;
        self.find(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("role {} not found", id)))
    }

    /// Rename the role and replace its whole permission set
    pub async fn update(&self, id: i64, name: &str, permission_ids: &[i64]) -> Result<Role, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE roles SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::classify)?;
        expect_affected(result.rows_affected(), "role", id)?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        assign_permissions(&mut tx, id, permission_ids).await?;

        tx.commit().await?;
        self.find(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("role {} not found", id)))
    }

    /// Join rows go with the role (ON DELETE CASCADE); users keep a NULL role
    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected(), "role", id)
    }

    async fn permissions_by_role(&self, role_ids: &[i64]) -> Result<HashMap<i64, Vec<Permission>>, DatabaseError> {
        let rows: Vec<(i64, i64, String)> = sqlx::query_as(
            "SELECT rp.role_id, p.id, p.name \
             FROM role_permissions rp JOIN permissions p ON p.id = rp.permission_id \
             WHERE rp.role_id = ANY($1) ORDER BY p.id",
        )
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<Permission>> = HashMap::new();
        for (role_id, id, name) in rows {
            grouped.entry(role_id).or_default().push(Permission { id, name });
        }
        Ok(grouped)
    }
}

async fn assign_permissions(
    tx: &mut Transaction<'_, Postgres>,
    role_id: i64,
    permission_ids: &[i64],
) -> Result<(), DatabaseError> {
    if permission_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id) \
         SELECT $1, UNNEST($2::bigint[]) ON CONFLICT DO NOTHING",
    )
    .bind(role_id)
    .bind(permission_ids)
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::classify)?;
    Ok(())
}

/// Permission lookups answered from the users/roles tables
pub struct PgPermissionLookup {
    pool: PgPool,
}

impl PgPermissionLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionLookup for PgPermissionLookup {
    async fn role_for_user(&self, user_id: i64) -> Result<Option<i64>, DatabaseError> {
        // The join drops users whose role row no longer exists
        let role_id: Option<i64> = sqlx::query_scalar(
            "SELECT r.id FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role_id)
    }

    async fn permissions_for_role(&self, role_id: i64) -> Result<Vec<String>, DatabaseError> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT p.name FROM role_permissions rp \
             JOIN permissions p ON p.id = rp.permission_id \
             WHERE rp.role_id = $1",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }
}
