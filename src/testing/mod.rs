//! In-memory stand-ins for the storage seams, for unit tests
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;

use crate::auth::permission::PermissionLookup;
use crate::config::AppConfig;
use crate::database::paginate::Paginated;
use crate::database::DatabaseError;
use crate::state::AppState;

/// Fixed user→role and role→permission tables
#[derive(Default)]
pub struct StaticPermissions {
    users: HashMap<i64, Option<i64>>,
    roles: HashMap<i64, Vec<String>>,
    fail: bool,
}

impl StaticPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every lookup fails as if the database were unreachable
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn role(mut self, role_id: i64, permissions: &[&str]) -> Self {
        self.roles
            .insert(role_id, permissions.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn user(mut self, user_id: i64, role_id: Option<i64>) -> Self {
        self.users.insert(user_id, role_id);
        self
    }
}

#[async_trait]
impl PermissionLookup for StaticPermissions {
    async fn role_for_user(&self, user_id: i64) -> Result<Option<i64>, DatabaseError> {
        if self.fail {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(self.users.get(&user_id).copied().flatten())
    }

    async fn permissions_for_role(&self, role_id: i64) -> Result<Vec<String>, DatabaseError> {
        if self.fail {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(self.roles.get(&role_id).cloned().unwrap_or_default())
    }
}

/// Entity kind backed by the integers `1..=n`, recording every window requested
pub struct FakeEntityKind {
    items: Vec<i64>,
    requests: Mutex<Vec<(i64, i64)>>,
    fail: bool,
}

impl FakeEntityKind {
    pub fn with_items(n: i64) -> Self {
        Self {
            items: (1..=n).collect(),
            requests: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_items(0)
        }
    }

    /// `(limit, offset)` pairs seen so far
    pub fn requests(&self) -> Vec<(i64, i64)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Paginated for FakeEntityKind {
    type Item = i64;

    async fn count(&self) -> Result<i64, DatabaseError> {
        Ok(self.items.len() as i64)
    }

    async fn fetch_page(&self, limit: i64, offset: i64) -> Result<Vec<i64>, DatabaseError> {
        if self.fail {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((limit, offset));
        }
        Ok(self
            .items
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .copied()
            .collect())
    }
}

pub const TEST_SECRET: &str = "test-secret";

/// State whose pool never connects; only routes that stop before touching
/// the database can be exercised with it
pub fn test_state(lookup: StaticPermissions) -> AppState {
    let mut config = AppConfig::default();
    config.security.jwt_secret = TEST_SECRET.to_string();

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(std::time::Duration::from_millis(200))
        .connect_lazy("postgres://nobody@127.0.0.1:1/none")
        .expect("lazy pool");

    AppState::with_lookup(pool, config, Arc::new(lookup))
}

/// Cookie header value carrying a valid session for `user_id`
pub fn session_cookie(user_id: i64) -> String {
    let claims = crate::auth::Claims::new(user_id, 1).expect("claims");
    let token = crate::auth::generate_jwt(&claims, TEST_SECRET).expect("token");
    format!("{}={}", crate::auth::SESSION_COOKIE, token)
}
