use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::permission::{Authorizer, PermissionLookup};
use crate::config::AppConfig;
use crate::database::repository::PgPermissionLookup;

/// Everything a handler needs, passed explicitly through the router
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub authorizer: Authorizer,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        let lookup = Arc::new(PgPermissionLookup::new(pool.clone()));
        Self::with_lookup(pool, config, lookup)
    }

    /// Same as `new` but with a caller-supplied permission source
    pub fn with_lookup(pool: PgPool, config: AppConfig, lookup: Arc<dyn PermissionLookup>) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            authorizer: Authorizer::new(lookup),
        }
    }
}
