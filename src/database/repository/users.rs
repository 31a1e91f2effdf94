use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use super::{count_rows, expect_affected, RoleRepository};
use crate::database::manager::DatabaseError;
use crate::database::models::{Role, User};
use crate::database::paginate::Paginated;

const USER_COLUMNS: &str = "id, first_name, last_name, email, password, role_id";

pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: Option<i64>,
}

/// Fields to overwrite; `None` leaves the column as it is
#[derive(Debug, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<i64>,
}

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// User with role and the role's permissions attached
    pub async fn find_with_role(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        match self.find(id).await? {
            Some(user) => Ok(self.attach_roles(vec![user]).await?.pop()),
            None => Ok(None),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn create(&self, new: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (first_name, last_name, email, password, role_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(new.first_name)
            .bind(new.last_name)
            .bind(new.email)
            .bind(new.password_hash)
            .bind(new.role_id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::classify)
    }

    pub async fn update(&self, id: i64, changes: UserChanges) -> Result<User, DatabaseError> {
        let sql = format!(
            "UPDATE users SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                email = COALESCE($4, email), \
                role_id = COALESCE($5, role_id) \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.email)
            .bind(changes.role_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::classify)?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {} not found", id)))
    }

    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<User, DatabaseError> {
        let sql = format!("UPDATE users SET password = $2 WHERE id = $1 RETURNING {}", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected(), "user", id)
    }

    async fn attach_roles(&self, users: Vec<User>) -> Result<Vec<User>, DatabaseError> {
        let mut role_ids: Vec<i64> = users.iter().filter_map(|u| u.role_id).collect();
        role_ids.sort_unstable();
        role_ids.dedup();

        let roles = RoleRepository::new(self.pool.clone()).load_many(&role_ids).await?;
        Ok(with_roles(users, &roles))
    }
}

/// Pair each user with its role; users whose role is gone keep `role: None`
fn with_roles(users: Vec<User>, roles: &HashMap<i64, Role>) -> Vec<User> {
    users
        .into_iter()
        .map(|mut user| {
            user.role = user.role_id.and_then(|id| roles.get(&id).cloned());
            user
        })
        .collect()
}

#[async_trait]
impl Paginated for UserRepository {
    type Item = User;

    async fn count(&self) -> Result<i64, DatabaseError> {
        count_rows(&self.pool, "users").await
    }

    async fn fetch_page(&self, limit: i64, offset: i64) -> Result<Vec<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        self.attach_roles(users).await
    }
}
