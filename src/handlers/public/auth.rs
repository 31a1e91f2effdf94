use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use tracing::info;

use crate::auth::password::{ensure_confirmed, hash_password_blocking, verify_password_blocking};
use crate::auth::{generate_jwt, Claims, SESSION_COOKIE};
use crate::config::SecurityConfig;
use crate::database::models::User;
use crate::database::repository::{NewUser, UserRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/register - create an account with the default role
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<User> {
    ensure_confirmed(&body.password, &body.password_confirm)?;
    let email = body.email.trim().to_string();
    if email.is_empty() {
        return Err(ApiError::field_error("email", "Email is required"));
    }

    let password_hash =
        hash_password_blocking(body.password, state.config.security.bcrypt_cost).await?;
    let user = UserRepository::new(state.pool.clone())
        .create(NewUser {
            first_name: body.first_name,
            last_name: body.last_name,
            email,
            password_hash,
            role_id: Some(state.config.accounts.default_role_id),
        })
        .await?;

    info!(user_id = user.id, "registered user");
    Ok(ApiResponse::created(user))
}

/// POST /api/login - check credentials and set the session cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<User>), ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_email(body.email.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("email not found"))?;

    if !verify_password_blocking(body.password, user.password.clone()).await? {
        info!(user_id = user.id, "login rejected: incorrect password");
        return Err(ApiError::bad_request("incorrect password"));
    }

    let security = &state.config.security;
    let claims = Claims::new(user.id, security.jwt_expiry_hours)?;
    let token = generate_jwt(&claims, &security.jwt_secret)?;

    info!(user_id = user.id, "user logged in");
    Ok((jar.add(session_cookie(token, &claims, security)), ApiResponse::success(user)))
}

/// Cookie lives exactly as long as the token inside it
fn session_cookie(token: String, claims: &Claims, security: &SecurityConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .path("/")
        .secure(security.cookie_secure)
        .max_age(time::Duration::seconds(claims.lifetime_secs()))
        .build()
}
