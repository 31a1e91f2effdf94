use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::{validate_jwt, SESSION_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user resolved from the session cookie
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Session middleware: validates the `jwt` cookie and injects [`AuthUser`]
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| {
            tracing::warn!(path = %request.uri().path(), "request without session cookie");
            ApiError::unauthorized("unauthorized")
        })?;

    let claims = validate_jwt(&token, &state.config.security.jwt_secret).map_err(|e| {
        tracing::warn!(path = %request.uri().path(), "rejected session: {}", e);
        ApiError::from(e)
    })?;
    let user_id = claims.user_id()?;

    request.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(request).await)
}
