//! E2E tests for material submission and viewing

mod common;

use common::TestServer;
use openshelf::data::Role;

#[tokio::test]
async fn test_submitted_material_is_pending() {
    let server = TestServer::new().await;
    let (_, token) = server.create_user("u1", Role::User).await;

    let response = server
        .submit_pdf(&token, "Calculus Notes", "General", &[])
        .await;
    assert_eq!(response.status(), 200);

    let material: serde_json::Value = response.json().await.unwrap();
    assert_eq!(material["approved"], false);
    assert_eq!(material["uploaded_by"], "u1");
    assert!(material["uploaded_at"].is_string());
    assert!(
        material["file_url"]
            .as_str()
            .unwrap()
            .starts_with("https://files.test.example.com/materials/")
    );
}

#[tokio::test]
async fn test_academic_submission_requires_subject_and_semester() {
    let server = TestServer::new().await;
    let (_, token) = server.create_user("u1", Role::User).await;

    let response = server
        .submit_pdf(&token, "Organic Chemistry", "Academic", &[])
        .await;
    assert_eq!(response.status(), 400);

    // Failed validation must leave no record behind.
    assert_eq!(server.state.db.count_materials().await.unwrap(), 0);
}

#[tokio::test]
async fn test_academic_submission_with_subject_and_semester() {
    let server = TestServer::new().await;
    let (_, token) = server.create_user("u1", Role::User).await;

    let response = server
        .submit_pdf(
            &token,
            "Organic Chemistry",
            "Academic",
            &[
                ("subject", "Chemistry"),
                ("semester", "2nd Semester"),
                ("tags", "organic, reactions"),
            ],
        )
        .await;
    assert_eq!(response.status(), 200);

    let material: serde_json::Value = response.json().await.unwrap();
    assert_eq!(material["subject"], "Chemistry");
    assert_eq!(material["semester"], "2nd Semester");
    assert_eq!(material["tags"][0], "organic");
}

#[tokio::test]
async fn test_non_pdf_upload_is_rejected() {
    let server = TestServer::new().await;
    let (_, token) = server.create_user("u1", Role::User).await;

    let part = reqwest::multipart::Part::bytes(b"GIF89a".to_vec())
        .file_name("image.gif")
        .mime_str("image/gif")
        .unwrap();
    let form = reqwest::multipart::Form::new()
        .text("title", "Not a document")
        .text("type", "Book")
        .text("category", "General")
        .part("file", part);

    let response = server
        .client
        .post(server.url("/api/v1/materials"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 415);
    assert_eq!(server.state.db.count_materials().await.unwrap(), 0);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let server = TestServer::new().await;
    let (_, token) = server.create_user("u1", Role::User).await;

    // Test config caps uploads at 1 MiB.
    let big = vec![0u8; 2 * 1024 * 1024];
    let part = reqwest::multipart::Part::bytes(big)
        .file_name("big.pdf")
        .mime_str("application/pdf")
        .unwrap();
    let form = reqwest::multipart::Form::new()
        .text("title", "Too big")
        .text("type", "Book")
        .text("category", "General")
        .part("file", part);

    let response = server
        .client
        .post(server.url("/api/v1/materials"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(server.state.db.count_materials().await.unwrap(), 0);
}

#[tokio::test]
async fn test_link_submission() {
    let server = TestServer::new().await;
    let (_, token) = server.create_user("u1", Role::User).await;

    let response = server
        .client
        .post(server.url("/api/v1/materials/link"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "External Paper",
            "description": "Hosted elsewhere",
            "type": "Article",
            "category": "General",
            "tags": ["external"],
            "file_url": "https://example.com/paper.pdf"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let material: serde_json::Value = response.json().await.unwrap();
    assert_eq!(material["file_url"], "https://example.com/paper.pdf");
    assert!(material["object_key"].is_null());
}

#[tokio::test]
async fn test_link_submission_rejects_non_http_url() {
    let server = TestServer::new().await;
    let (_, token) = server.create_user("u1", Role::User).await;

    let response = server
        .client
        .post(server.url("/api/v1/materials/link"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Sneaky",
            "type": "Article",
            "category": "General",
            "file_url": "ftp://example.com/paper.pdf"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_get_published_material_by_id() {
    let server = TestServer::new().await;
    let (_, token) = server.create_user("u1", Role::User).await;
    let (_, admin_token) = server.create_user("a1", Role::Admin).await;

    let id = server
        .publish_pdf(&token, &admin_token, "Lookup Me", "General", &[])
        .await;

    let response = server
        .client
        .get(server.url(&format!("/api/v1/materials/{}", id)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let fetched: serde_json::Value = response.json().await.unwrap();
    assert_eq!(fetched["title"], "Lookup Me");
}

#[tokio::test]
async fn test_pending_material_resolves_only_for_admins() {
    let server = TestServer::new().await;
    let (_, token) = server.create_user("u1", Role::User).await;
    let (_, admin_token) = server.create_user("a1", Role::Admin).await;

    let response = server
        .submit_pdf(&token, "Unreviewed Draft", "General", &[])
        .await;
    let material: serde_json::Value = response.json().await.unwrap();
    let id = material["id"].as_str().unwrap().to_string();
    let path = format!("/api/v1/materials/{}", id);

    // Anonymous and non-admin callers get the same answer as for an
    // id that never existed.
    let response = server.client.get(server.url(&path)).send().await.unwrap();
    assert_eq!(response.status(), 404);

    let response = server
        .client
        .get(server.url(&path))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Admin preview still works.
    let response = server
        .client
        .get(server.url(&path))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let fetched: serde_json::Value = response.json().await.unwrap();
    assert_eq!(fetched["title"], "Unreviewed Draft");
    assert_eq!(fetched["approved"], false);
}

#[tokio::test]
async fn test_materials_gauge_tracks_submissions() {
    let server = TestServer::new().await;
    let (_, token) = server.create_user("u1", Role::User).await;

    let before = openshelf::metrics::MATERIALS_TOTAL.get();

    let response = server.submit_pdf(&token, "Counted", "General", &[]).await;
    assert_eq!(response.status(), 200);

    assert!(openshelf::metrics::MATERIALS_TOTAL.get() >= before + 1);
}

#[tokio::test]
async fn test_get_unknown_material_is_404() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/api/v1/materials/01ARZ3NDEKTSV4RRFFQ69G5FAV"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}
