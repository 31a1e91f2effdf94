use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::database::models::Role;
use crate::database::repository::RoleRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Permission ids arrive as numbers or as numeric strings from form clients
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PermissionId {
    Int(i64),
    Text(String),
}

impl PermissionId {
    fn resolve(&self) -> Result<i64, ApiError> {
        match self {
            PermissionId::Int(id) => Ok(*id),
            PermissionId::Text(text) => text.trim().parse().map_err(|_| {
                ApiError::field_error("permissions", format!("'{}' is not a permission id", text))
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<PermissionId>,
}

impl RoleRequest {
    fn validated(&self) -> Result<(&str, Vec<i64>), ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::field_error("name", "Role name is required"));
        }
        let mut ids = self
            .permissions
            .iter()
            .map(PermissionId::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        ids.sort_unstable();
        ids.dedup();
        Ok((name, ids))
    }
}

/// GET /api/roles - every role with its permissions
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Role>> {
    let roles = RoleRepository::new(state.pool.clone()).all().await?;
    Ok(ApiResponse::success(roles))
}

/// POST /api/roles
pub async fn create(State(state): State<AppState>, Json(body): Json<RoleRequest>) -> ApiResult<Role> {
    let (name, permission_ids) = body.validated()?;
    let role = RoleRepository::new(state.pool.clone())
        .create(name, &permission_ids)
        .await?;

    info!(role_id = role.id, permissions = permission_ids.len(), "created role");
    Ok(ApiResponse::created(role))
}

/// GET /api/roles/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Role> {
    let role = RoleRepository::new(state.pool.clone())
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("role {} not found", id)))?;
    Ok(ApiResponse::success(role))
}

/// PUT /api/roles/:id - rename and replace the permission set
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<RoleRequest>,
) -> ApiResult<Role> {
    let (name, permission_ids) = body.validated()?;
    let role = RoleRepository::new(state.pool.clone())
        .update(id, name, &permission_ids)
        .await?;

    info!(role_id = id, permissions = permission_ids.len(), "updated role");
    Ok(ApiResponse::success(role))
}

/// DELETE /api/roles/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    RoleRepository::new(state.pool.clone()).delete(id).await?;
    info!(role_id = id, "deleted role");
    Ok(ApiResponse::<()>::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_numeric_and_string_ids() {
        let body: RoleRequest = serde_json::from_value(json!({
            "name": " Editor ",
            "permissions": [3, "1", " 2", 3]
        }))
        .unwrap();

        let (name, ids) = body.validated().unwrap();
        assert_eq!(name, "Editor");
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn permissions_default_to_empty() {
        let body: RoleRequest = serde_json::from_value(json!({ "name": "Nobody" })).unwrap();
        assert!(body.validated().unwrap().1.is_empty());
    }

    #[test]
    fn rejects_non_numeric_id() {
        let body: RoleRequest =
            serde_json::from_value(json!({ "name": "X", "permissions": ["abc"] })).unwrap();
        let err = body.validated().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn rejects_blank_name() {
        let body: RoleRequest = serde_json::from_value(json!({ "name": "  " })).unwrap();
        assert_eq!(body.validated().unwrap_err().status_code(), 400);
    }
}
