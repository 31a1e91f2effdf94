use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::auth::password::hash_password_blocking;
use crate::database::models::User;
use crate::database::paginate::paginate;
use crate::database::repository::{NewUser, UserChanges, UserRepository};
use crate::error::ApiError;
use crate::handlers::PageQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<i64>,
}

/// GET /api/users - one page of users with their roles
pub async fn list(State(state): State<AppState>, Query(query): Query<PageQuery>) -> ApiResult<Vec<User>> {
    let page = paginate(&UserRepository::new(state.pool.clone()), query.page()).await?;
    Ok(ApiResponse::paged(page))
}

/// POST /api/users - create an account with the configured initial password
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<User> {
    let email = body.email.trim().to_string();
    if email.is_empty() {
        return Err(ApiError::field_error("email", "Email is required"));
    }

    let password_hash = hash_password_blocking(
        state.config.accounts.default_password.clone(),
        state.config.security.bcrypt_cost,
    )
    .await?;

    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .create(NewUser {
            first_name: body.first_name,
            last_name: body.last_name,
            email,
            password_hash,
            role_id: Some(body.role_id.unwrap_or(state.config.accounts.default_role_id)),
        })
        .await?;

    info!(user_id = user.id, "created user");
    let user = repo.find_with_role(user.id).await?.unwrap_or(user);
    Ok(ApiResponse::created(user))
}

/// GET /api/users/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<User> {
    let user = UserRepository::new(state.pool.clone())
        .find_with_role(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user {} not found", id)))?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/users/:id - partial update, role included
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .update(
            id,
            UserChanges {
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
                role_id: body.role_id,
            },
        )
        .await?;
    let user = repo.find_with_role(id).await?.unwrap_or(user);
    Ok(ApiResponse::success(user))
}

/// DELETE /api/users/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    UserRepository::new(state.pool.clone()).delete(id).await?;
    info!(user_id = id, "deleted user");
    Ok(ApiResponse::<()>::no_content())
}
