use std::sync::Arc;

use anyhow::Context;
use axum::http::Method;
use serde_json::json;

use crate::auth::permission::{AuthorizeError, Authorizer};
use crate::auth::{generate_jwt, Claims, SESSION_COOKIE};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::connect_pool;
use crate::database::repository::PgPermissionLookup;

/// Print a session token, usable as `Cookie: jwt=<token>`
pub fn issue(
    config: &AppConfig,
    user_id: i64,
    hours: Option<u64>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let hours = hours.unwrap_or(config.security.jwt_expiry_hours);
    let token = generate_jwt(&Claims::new(user_id, hours)?, &config.security.jwt_secret)?;

    output_success(
        output_format,
        &format!("Token for user {} ({}h)", user_id, hours),
        Some(json!({ "token": token, "cookie": format!("{}={}", SESSION_COOKIE, token) })),
    )
}

/// Run the same authorization the router runs, against the configured database
pub async fn check(
    config: &AppConfig,
    user_id: i64,
    resource: &str,
    method: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method: {}", method))?;

    let pool = connect_pool(&config.database)?;
    let authorizer = Authorizer::new(Arc::new(PgPermissionLookup::new(pool)));

    let granted = match authorizer.authorize_user(user_id, resource, &method).await {
        Ok(()) => true,
        Err(AuthorizeError::Unauthorized(_)) => false,
        Err(AuthorizeError::Storage(e)) => return Err(e.into()),
    };

    let verdict = if granted { "granted" } else { "denied" };
    output_success(
        output_format,
        &format!("{} {} for user {}: {}", method, resource, user_id, verdict),
        Some(json!({ "granted": granted })),
    )
}
