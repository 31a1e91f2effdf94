use sqlx::PgPool;

use crate::database::manager::DatabaseError;

pub mod orders;
pub mod permissions;
pub mod products;
pub mod roles;
pub mod users;

pub use orders::OrderRepository;
pub use permissions::PermissionRepository;
pub use products::{NewProduct, ProductChanges, ProductRepository};
pub use roles::{PgPermissionLookup, RoleRepository};
pub use users::{NewUser, UserChanges, UserRepository};

/// Row count for one of the fixed application tables
async fn count_rows(pool: &PgPool, table: &'static str) -> Result<i64, DatabaseError> {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(count)
}

/// Turn an affected-row count of zero into a 404
fn expect_affected(rows: u64, what: &str, id: i64) -> Result<(), DatabaseError> {
    if rows == 0 {
        Err(DatabaseError::NotFound(format!("{} {} not found", what, id)))
    } else {
        Ok(())
    }
}
