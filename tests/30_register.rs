mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn register_requires_matching_passwords() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/register"))
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "password": "first",
            "password_confirm": "second"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Passwords do not match");
    Ok(())
}

#[tokio::test]
async fn login_with_unknown_email_is_not_a_session() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/login"))
        .json(&json!({ "email": "nobody@nowhere.invalid", "password": "x" }))
        .send()
        .await?;

    // NOT_FOUND with a database; a server error without one
    assert!(
        matches!(
            res.status(),
            StatusCode::NOT_FOUND | StatusCode::INTERNAL_SERVER_ERROR | StatusCode::SERVICE_UNAVAILABLE
        ),
        "unexpected status: {}",
        res.status()
    );
    assert!(res.headers().get(reqwest::header::SET_COOKIE).is_none());
    Ok(())
}

#[tokio::test]
async fn malformed_login_body_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/login"))
        .json(&json!({ "email": "missing-password@example.com" }))
        .send()
        .await?;

    assert!(res.status().is_client_error(), "unexpected status: {}", res.status());
    Ok(())
}
