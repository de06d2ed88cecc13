//! Common test utilities for E2E tests

use chrono::{Duration, Utc};
use openshelf::auth::session::{Session, create_session_token};
use openshelf::data::{Role, UserProfile};
use openshelf::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig {
                path: db_path.clone(),
            },
            storage: config::StorageConfig {
                backend: config::StorageBackend::Memory,
                bucket: "test-materials".to_string(),
                public_url: "https://files.test.example.com".to_string(),
                s3: config::S3Config::default(),
            },
            auth: config::AuthConfig {
                session_secret: "test-secret-key-32-bytes-long!!!".to_string(),
                session_max_age: 604800,
                google: config::GoogleOAuthConfig {
                    client_id: "test-client-id".to_string(),
                    client_secret: "test-client-secret".to_string(),
                },
            },
            admin: config::AdminConfig {
                bootstrap_emails: vec![],
            },
            upload: config::UploadConfig {
                max_bytes: 1024 * 1024,
            },
            seed: config::SeedConfig { on_startup: false },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = openshelf::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Create a profile row and mint a session token for it.
    pub async fn create_user(&self, user_id: &str, role: Role) -> (UserProfile, String) {
        let profile = UserProfile {
            user_id: user_id.to_string(),
            name: format!("Test {}", user_id),
            email: format!("{}@test.example.com", user_id),
            role: role.as_str().to_string(),
            created_at: Utc::now(),
        };
        self.state
            .db
            .insert_profile_if_absent(&profile)
            .await
            .unwrap();

        let now = Utc::now();
        let session = Session {
            user_id: profile.user_id.clone(),
            email: profile.email.clone(),
            name: Some(profile.name.clone()),
            created_at: now,
            expires_at: now + Duration::days(7),
        };
        let token = create_session_token(&session, &self.state.config.auth.session_secret)
            .expect("Failed to create test token");

        (profile, token)
    }

    /// Submit a small PDF through the multipart endpoint.
    ///
    /// `extra` fields are appended as-is so tests can set subject,
    /// semester, and tags.
    pub async fn submit_pdf(
        &self,
        token: &str,
        title: &str,
        category: &str,
        extra: &[(&str, &str)],
    ) -> reqwest::Response {
        let mut form = reqwest::multipart::Form::new()
            .text("title", title.to_string())
            .text("description", "test material".to_string())
            .text("type", "Book".to_string())
            .text("category", category.to_string());

        for (name, value) in extra {
            form = form.text(name.to_string(), value.to_string());
        }

        let part = reqwest::multipart::Part::bytes(b"%PDF-1.4 test".to_vec())
            .file_name("test.pdf")
            .mime_str("application/pdf")
            .unwrap();
        form = form.part("file", part);

        self.client
            .post(self.url("/api/v1/materials"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .unwrap()
    }

    /// Submit and approve a material, returning its id.
    pub async fn publish_pdf(
        &self,
        token: &str,
        admin_token: &str,
        title: &str,
        category: &str,
        extra: &[(&str, &str)],
    ) -> String {
        let response = self.submit_pdf(token, title, category, extra).await;
        assert_eq!(response.status(), 200);
        let material: serde_json::Value = response.json().await.unwrap();
        let id = material["id"].as_str().unwrap().to_string();

        let response = self
            .client
            .post(self.url(&format!("/api/v1/admin/materials/{}/approve", id)))
            .bearer_auth(admin_token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 204);

        id
    }
}
