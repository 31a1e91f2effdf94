use serde::Serialize;
use sqlx::FromRow;

use super::Role;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// bcrypt hash; never leaves the server
    #[serde(skip_serializing)]
    pub password: String,
    /// NULL once the role has been deleted
    pub role_id: Option<i64>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}
