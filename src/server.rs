use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::{connect_pool, health_check};
use crate::handlers::{protected, public};
use crate::middleware::{require_permission, session_middleware, ResourceGuard};
use crate::state::AppState;

/// Full router: public routes, session-only account routes, and the
/// permission-guarded resource routes
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let protected = Router::new()
        .merge(account_routes())
        .merge(guarded(&state, "users", user_routes()))
        .merge(guarded(&state, "roles", role_routes()))
        .merge(guarded(&state, "products", product_routes()))
        .merge(guarded(&state, "orders", order_routes()))
        .layer(from_fn_with_state(state.clone(), session_middleware));

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/register", post(public::register))
        .route("/api/login", post(public::login))
        .merge(protected)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security))
        .with_state(state);

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn guarded(state: &AppState, resource: &'static str, routes: Router<AppState>) -> Router<AppState> {
    let guard = ResourceGuard::new(state.authorizer.clone(), resource);
    routes.route_layer(from_fn_with_state(guard, require_permission))
}

fn account_routes() -> Router<AppState> {
    use protected::account;

    Router::new()
        .route("/api/user", get(account::user))
        .route("/api/logout", post(account::logout))
        .route("/api/users/info", put(account::update_info))
        .route("/api/users/password", put(account::update_password))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
}

fn role_routes() -> Router<AppState> {
    use protected::{permissions, roles};

    Router::new()
        .route("/api/roles", get(roles::list).post(roles::create))
        .route(
            "/api/roles/:id",
            get(roles::get).put(roles::update).delete(roles::delete),
        )
        .route("/api/permissions", get(permissions::list).post(permissions::create))
}

fn product_routes() -> Router<AppState> {
    use protected::{products, upload};

    Router::new()
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/:id",
            get(products::get).put(products::update).delete(products::delete),
        )
        .route("/api/upload", post(upload::upload))
}

fn order_routes() -> Router<AppState> {
    use protected::orders;

    Router::new()
        .route("/api/orders", get(orders::list))
        .route("/api/export", post(orders::export))
        .route("/api/chart", get(orders::chart))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Admin API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Accounts, roles and permissions, products and orders",
            "endpoints": {
                "public": "/api/register, /api/login",
                "account": "/api/user, /api/logout, /api/users/info, /api/users/password (session)",
                "users": "/api/users[/:id] (users permission)",
                "roles": "/api/roles[/:id], /api/permissions (roles permission)",
                "products": "/api/products[/:id], /api/upload (products permission)",
                "orders": "/api/orders, /api/export, /api/chart (orders permission)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

/// Bind and serve until Ctrl-C
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let pool = connect_pool(&config.database)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));
    info!(
        "Starting Admin API in {:?} mode (database {})",
        config.environment,
        config.redacted_database_url()
    );

    let app = app(AppState::new(pool, config));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Admin API listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::testing::{session_cookie, test_state, StaticPermissions};

    fn editor() -> StaticPermissions {
        StaticPermissions::new()
            .role(2, &["view_products", "edit_orders"])
            .user(5, Some(2))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_request(uri: &str, cookie: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn root_is_public() {
        let (status, body) = send(app(test_state(editor())), get_request("/", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Admin API");
    }

    #[tokio::test]
    async fn account_route_needs_a_session() {
        let (status, body) = send(app(test_state(editor())), get_request("/api/user", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn forged_cookie_is_rejected() {
        let cookie = Some("jwt=not-a-token".to_string());
        let (status, _) = send(app(test_state(editor())), get_request("/api/products", cookie)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn view_permission_does_not_allow_create() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/products")
            .header(header::COOKIE, session_cookie(5))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title":"Mug","price":3}"#))
            .unwrap();

        let (status, body) = send(app(test_state(editor())), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn resource_without_any_permission_is_rejected() {
        let (status, _) = send(
            app(test_state(editor())),
            get_request("/api/users", Some(session_cookie(5))),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_rejects_mismatched_confirmation_before_storage() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"first_name":"A","last_name":"B","email":"a@b.c","password":"one","password_confirm":"two"}"#,
            ))
            .unwrap();

        let (status, body) = send(app(test_state(editor())), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Passwords do not match");
    }

    #[tokio::test]
    async fn logout_clears_the_cookie() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/logout")
            .header(header::COOKIE, session_cookie(5))
            .body(Body::empty())
            .unwrap();

        let response = app(test_state(editor())).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(set_cookie.starts_with("jwt="));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
