use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::auth::permission::parse_permission_name;
use crate::database::models::Permission;
use crate::database::repository::PermissionRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PermissionRequest {
    pub name: String,
}

/// GET /api/permissions
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Permission>> {
    let permissions = PermissionRepository::new(state.pool.clone()).all().await?;
    Ok(ApiResponse::success(permissions))
}

/// POST /api/permissions - only `view_<resource>` / `edit_<resource>` names
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<PermissionRequest>,
) -> ApiResult<Permission> {
    let name = body.name.trim();
    if parse_permission_name(name).is_none() {
        return Err(ApiError::field_error(
            "name",
            "must be view_<resource> or edit_<resource>",
        ));
    }

    let permission = PermissionRepository::new(state.pool.clone()).create(name).await?;
    info!(permission = %permission.name, "created permission");
    Ok(ApiResponse::created(permission))
}
