use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::auth::permission::Authorizer;
use crate::error::ApiError;

/// Route-layer state naming the resource a group of routes belongs to
#[derive(Clone)]
pub struct ResourceGuard {
    authorizer: Authorizer,
    resource: &'static str,
}

impl ResourceGuard {
    pub fn new(authorizer: Authorizer, resource: &'static str) -> Self {
        Self { authorizer, resource }
    }
}

/// Permission middleware; must run inside the session middleware
pub async fn require_permission(
    State(guard): State<ResourceGuard>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| ApiError::unauthorized("unauthorized"))?;

    guard
        .authorizer
        .authorize_user(user.user_id, guard.resource, request.method())
        .await?;

    Ok(next.run(request).await)
}
