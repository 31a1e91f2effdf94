use serde::Serialize;
use sqlx::FromRow;

use super::Permission;

#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[sqlx(skip)]
    pub permissions: Vec<Permission>,
}
