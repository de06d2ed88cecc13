//! E2E tests for authentication and profile resolution

mod common;

use common::TestServer;
use openshelf::data::Role;

#[tokio::test]
async fn test_profile_requires_authentication() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/api/v1/profile"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_submission_requires_authentication() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/api/v1/materials/link"))
        .json(&serde_json::json!({
            "title": "t",
            "type": "Book",
            "category": "General",
            "file_url": "https://example.com/doc.pdf"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/api/v1/profile"))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_profile_returns_stored_role() {
    let server = TestServer::new().await;
    let (_, token) = server.create_user("admin1", Role::Admin).await;

    let response = server
        .client
        .get(server.url("/api/v1/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let profile: serde_json::Value = response.json().await.unwrap();
    assert_eq!(profile["user_id"], "admin1");
    assert_eq!(profile["role"], "admin");
}

#[tokio::test]
async fn test_first_authenticated_request_creates_profile() {
    let server = TestServer::new().await;

    // Mint a token without pre-creating the profile row.
    use chrono::{Duration, Utc};
    use openshelf::auth::session::{Session, create_session_token};

    let now = Utc::now();
    let session = Session {
        user_id: "fresh-user".to_string(),
        email: "fresh@test.example.com".to_string(),
        name: Some("Fresh User".to_string()),
        created_at: now,
        expires_at: now + Duration::days(7),
    };
    let token = create_session_token(&session, &server.state.config.auth.session_secret).unwrap();

    let response = server
        .client
        .get(server.url("/api/v1/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let profile: serde_json::Value = response.json().await.unwrap();
    assert_eq!(profile["role"], "user");

    let stored = server
        .state
        .db
        .get_profile("fresh-user")
        .await
        .unwrap()
        .expect("profile should exist after first request");
    assert_eq!(stored.email, "fresh@test.example.com");
}
