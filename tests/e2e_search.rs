//! E2E tests for catalog search

mod common;

use common::TestServer;
use openshelf::data::Role;

#[tokio::test]
async fn test_blank_query_is_rejected() {
    let server = TestServer::new().await;

    for path in ["/api/v1/search", "/api/v1/search?q=", "/api/v1/search?q=%20"] {
        let response = server.client.get(server.url(path)).send().await.unwrap();
        assert_eq!(response.status(), 400);
    }
}

#[tokio::test]
async fn test_search_matches_title_case_insensitively() {
    let server = TestServer::new().await;
    let (_, user_token) = server.create_user("u1", Role::User).await;
    let (_, admin_token) = server.create_user("a1", Role::Admin).await;

    server
        .publish_pdf(&user_token, &admin_token, "Linear Algebra", "General", &[])
        .await;

    let response = server
        .client
        .get(server.url("/api/v1/search?q=ALGEBRA"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let results: serde_json::Value = response.json().await.unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["title"], "Linear Algebra");
}

#[tokio::test]
async fn test_search_spans_both_categories() {
    let server = TestServer::new().await;
    let (_, user_token) = server.create_user("u1", Role::User).await;
    let (_, admin_token) = server.create_user("a1", Role::Admin).await;

    server
        .publish_pdf(&user_token, &admin_token, "Quantum Stories", "General", &[])
        .await;
    server
        .publish_pdf(
            &user_token,
            &admin_token,
            "Quantum Mechanics",
            "Academic",
            &[("subject", "Physics"), ("semester", "4th Semester")],
        )
        .await;

    let response = server
        .client
        .get(server.url("/api/v1/search?q=quantum"))
        .send()
        .await
        .unwrap();

    let results: serde_json::Value = response.json().await.unwrap();
    assert_eq!(results.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_matches_tags() {
    let server = TestServer::new().await;
    let (_, user_token) = server.create_user("u1", Role::User).await;
    let (_, admin_token) = server.create_user("a1", Role::Admin).await;

    server
        .publish_pdf(
            &user_token,
            &admin_token,
            "Untitled Collection",
            "General",
            &[("tags", "poetry, anthology")],
        )
        .await;

    let response = server
        .client
        .get(server.url("/api/v1/search?q=poetry"))
        .send()
        .await
        .unwrap();

    let results: serde_json::Value = response.json().await.unwrap();
    assert_eq!(results.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_excludes_pending() {
    let server = TestServer::new().await;
    let (_, user_token) = server.create_user("u1", Role::User).await;

    let response = server
        .submit_pdf(&user_token, "Secret Draft", "General", &[])
        .await;
    assert_eq!(response.status(), 200);

    let response = server
        .client
        .get(server.url("/api/v1/search?q=secret"))
        .send()
        .await
        .unwrap();

    let results: serde_json::Value = response.json().await.unwrap();
    assert_eq!(results.as_array().unwrap().len(), 0);
}
