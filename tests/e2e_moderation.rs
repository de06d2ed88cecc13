//! E2E tests for the admin moderation workflow

mod common;

use common::TestServer;
use openshelf::data::Role;

async fn submit_and_get_id(server: &TestServer, token: &str, title: &str) -> String {
    let response = server.submit_pdf(token, title, "General", &[]).await;
    assert_eq!(response.status(), 200);
    let material: serde_json::Value = response.json().await.unwrap();
    material["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_non_admin_cannot_moderate() {
    let server = TestServer::new().await;
    let (_, user_token) = server.create_user("u1", Role::User).await;
    let id = submit_and_get_id(&server, &user_token, "Mine").await;

    for path in [
        format!("/api/v1/admin/materials/{}/approve", id),
        format!("/api/v1/admin/materials/{}/reject", id),
    ] {
        let response = server
            .client
            .post(server.url(&path))
            .bearer_auth(&user_token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 403);
    }

    let response = server
        .client
        .get(server.url("/api/v1/admin/pending"))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_pending_invisible_until_approved() {
    let server = TestServer::new().await;
    let (_, user_token) = server.create_user("u1", Role::User).await;
    let (_, admin_token) = server.create_user("a1", Role::Admin).await;

    let id = submit_and_get_id(&server, &user_token, "Hidden Until Approved").await;

    let response = server
        .client
        .get(server.url("/api/v1/catalog/General"))
        .send()
        .await
        .unwrap();
    let page: serde_json::Value = response.json().await.unwrap();
    assert_eq!(page["materials"].as_array().unwrap().len(), 0);

    let response = server
        .client
        .post(server.url(&format!("/api/v1/admin/materials/{}/approve", id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = server
        .client
        .get(server.url("/api/v1/catalog/General"))
        .send()
        .await
        .unwrap();
    let page: serde_json::Value = response.json().await.unwrap();
    let materials = page["materials"].as_array().unwrap();
    assert_eq!(materials.len(), 1);
    assert_eq!(materials[0]["title"], "Hidden Until Approved");
}

#[tokio::test]
async fn test_approve_is_idempotent() {
    let server = TestServer::new().await;
    let (_, user_token) = server.create_user("u1", Role::User).await;
    let (_, admin_token) = server.create_user("a1", Role::Admin).await;

    let id = submit_and_get_id(&server, &user_token, "Approve Twice").await;
    let path = format!("/api/v1/admin/materials/{}/approve", id);

    for _ in 0..2 {
        let response = server
            .client
            .post(server.url(&path))
            .bearer_auth(&admin_token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 204);
    }
}

#[tokio::test]
async fn test_approve_after_delete_is_404() {
    let server = TestServer::new().await;
    let (_, user_token) = server.create_user("u1", Role::User).await;
    let (_, admin_token) = server.create_user("a1", Role::Admin).await;

    let id = submit_and_get_id(&server, &user_token, "Delete Wins").await;

    let response = server
        .client
        .delete(server.url(&format!("/api/v1/admin/materials/{}", id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    // The delete wins; a late approve must not resurrect the record.
    let response = server
        .client
        .post(server.url(&format!("/api/v1/admin/materials/{}/approve", id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(server.state.db.count_materials().await.unwrap(), 0);
}

#[tokio::test]
async fn test_reject_removes_record() {
    let server = TestServer::new().await;
    let (_, user_token) = server.create_user("u1", Role::User).await;
    let (_, admin_token) = server.create_user("a1", Role::Admin).await;

    let id = submit_and_get_id(&server, &user_token, "Rejected").await;

    let response = server
        .client
        .post(server.url(&format!("/api/v1/admin/materials/{}/reject", id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = server
        .client
        .get(server.url(&format!("/api/v1/materials/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Retrying the reject reports the already-satisfied terminal state.
    let response = server
        .client
        .post(server.url(&format!("/api/v1/admin/materials/{}/reject", id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_reject_published_material_conflicts() {
    let server = TestServer::new().await;
    let (_, user_token) = server.create_user("u1", Role::User).await;
    let (_, admin_token) = server.create_user("a1", Role::Admin).await;

    let id = server
        .publish_pdf(&user_token, &admin_token, "Published", "General", &[])
        .await;

    let response = server
        .client
        .post(server.url(&format!("/api/v1/admin/materials/{}/reject", id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // Still published.
    let response = server
        .client
        .get(server.url(&format!("/api/v1/materials/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_delete_works_in_any_state() {
    let server = TestServer::new().await;
    let (_, user_token) = server.create_user("u1", Role::User).await;
    let (_, admin_token) = server.create_user("a1", Role::Admin).await;

    let published = server
        .publish_pdf(&user_token, &admin_token, "Published", "General", &[])
        .await;
    let pending = submit_and_get_id(&server, &user_token, "Pending").await;

    for id in [published, pending] {
        let response = server
            .client
            .delete(server.url(&format!("/api/v1/admin/materials/{}", id)))
            .bearer_auth(&admin_token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 204);
    }

    assert_eq!(server.state.db.count_materials().await.unwrap(), 0);
}

#[tokio::test]
async fn test_pending_and_approved_queues() {
    let server = TestServer::new().await;
    let (_, user_token) = server.create_user("u1", Role::User).await;
    let (_, admin_token) = server.create_user("a1", Role::Admin).await;

    submit_and_get_id(&server, &user_token, "Still Pending").await;
    server
        .publish_pdf(&user_token, &admin_token, "Already Published", "General", &[])
        .await;

    let response = server
        .client
        .get(server.url("/api/v1/admin/pending"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    let pending: serde_json::Value = response.json().await.unwrap();
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["title"], "Still Pending");

    let response = server
        .client
        .get(server.url("/api/v1/admin/approved"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    let approved: serde_json::Value = response.json().await.unwrap();
    let approved = approved.as_array().unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0]["title"], "Already Published");
}
