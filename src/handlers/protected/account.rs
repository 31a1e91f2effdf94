use axum::{extract::State, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::password::{ensure_confirmed, hash_password_blocking};
use crate::auth::SESSION_COOKIE;
use crate::database::models::User;
use crate::database::repository::{UserChanges, UserRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateInfoRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
    pub password_confirm: String,
}

/// GET /api/user - the signed-in user with role and permissions
pub async fn user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<User> {
    let user = UserRepository::new(state.pool.clone())
        .find_with_role(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;
    Ok(ApiResponse::success(user))
}

/// POST /api/logout - expire the session cookie
pub async fn logout(
    Extension(auth): Extension<AuthUser>,
    jar: CookieJar,
) -> (CookieJar, ApiResponse<Value>) {
    info!(user_id = auth.user_id, "user logged out");
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, ApiResponse::success(json!({ "message": "success" })))
}

/// PUT /api/users/info - edit the signed-in user's own profile
pub async fn update_info(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateInfoRequest>,
) -> ApiResult<User> {
    let changes = UserChanges {
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
        role_id: None,
    };
    let user = UserRepository::new(state.pool.clone())
        .update(auth.user_id, changes)
        .await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/users/password - change the signed-in user's password
pub async fn update_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdatePasswordRequest>,
) -> ApiResult<User> {
    ensure_confirmed(&body.password, &body.password_confirm)?;

    let hash = hash_password_blocking(body.password, state.config.security.bcrypt_cost).await?;
    let user = UserRepository::new(state.pool.clone())
        .update_password(auth.user_id, &hash)
        .await?;

    info!(user_id = auth.user_id, "password changed");
    Ok(ApiResponse::success(user))
}
