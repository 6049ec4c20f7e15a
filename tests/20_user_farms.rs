mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{TestServer, JWT_SECRET};
use farmwatch_api::auth::TokenService;

#[tokio::test]
async fn user_farms_without_header_is_unauthorized() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = server.get("/user/farms").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "unauthorized, no token");

    let (status, _) = server.post("/user/farms", json!({ "name": "Sneaky" })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn expired_token_is_unauthorized() -> Result<()> {
    let server = TestServer::start().await?;

    let tokens = TokenService::new(JWT_SECRET, Duration::hours(24));
    let issued_at = Utc::now() - Duration::hours(24) - Duration::minutes(1);
    let token = tokens.issue_at(Uuid::new_v4(), "old@example.com", false, issued_at)?;

    let (status, body) = server.get_with_token("/user/farms", &token).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "unauthorized, invalid token");
    Ok(())
}

#[tokio::test]
async fn token_signed_with_another_secret_is_unauthorized() -> Result<()> {
    let server = TestServer::start().await?;

    let forged = TokenService::new("not-the-server-secret", Duration::hours(24))
        .issue(Uuid::new_v4(), "mallory@example.com", true)?;
    let (status, _) = server.get_with_token("/user/farms", &forged).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn user_farms_are_scoped_to_the_token_owner() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("alice@example.com", "alice-pw").await?;
    let bob = server.register("bob@example.com", "bob-pw").await?;

    let (status, created) = server
        .post_with_token("/user/farms", &alice, json!({ "name": "Alice Orchard", "location": "Nyeri" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let alice_id = created["data"]["owner"].as_str().unwrap().to_string();

    // An owner in the body cannot override the token's identity
    let (status, created) = server
        .post_with_token(
            "/user/farms",
            &bob,
            json!({ "name": "Bob Ranch", "owner": alice_id }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(created["data"]["owner"], alice_id.as_str());

    // Unowned farm created through the public route
    server.create("/farms", json!({ "name": "Community Plot" })).await?;

    let (status, body) = server.get_with_token("/user/farms", &alice).await?;
    assert_eq!(status, StatusCode::OK);
    let farms = body["data"].as_array().unwrap();
    assert_eq!(farms.len(), 1);
    assert_eq!(farms[0]["name"], "Alice Orchard");
    assert_eq!(farms[0]["owner"], alice_id.as_str());

    let (_, body) = server.get(&format!("/farms?owner={}", alice_id)).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = server.get("/farms").await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    Ok(())
}

#[tokio::test]
async fn me_lists_identity_without_password() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.register("mwangi@example.com", "pw").await?;

    let (status, body) = server.get_with_token("/user/me", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "mwangi@example.com");
    assert_eq!(body["data"]["user"]["is_admin"], false);
    assert!(body["data"]["user"].get("password").is_none());
    assert_eq!(body["data"]["groups"], json!([]));
    assert_eq!(body["data"]["farms"], json!([]));

    let (status, _) = server
        .post_with_token("/user/farms", &token, json!({ "name": "Mwangi Acres" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    server.create("/farms", json!({ "name": "Someone Else's" })).await?;

    let (_, body) = server.get_with_token("/user/me", &token).await?;
    let farms = body["data"]["farms"].as_array().unwrap();
    assert_eq!(farms.len(), 1);
    assert_eq!(farms[0]["name"], "Mwangi Acres");
    Ok(())
}
