//! OpenShelf - a digital library server with an admin moderation workflow
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Submission, catalog, search, SSE endpoints               │
//! │  - Admin moderation endpoints                               │
//! │  - Auth endpoints (Google OAuth)                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Material lifecycle engine (submit/approve/reject/delete) │
//! │  - Catalog views and search                                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx)                                            │
//! │  - S3-compatible object storage                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers for the library and admin APIs
//! - `service`: Business logic layer
//! - `events`: Change-notification bus feeding the SSE endpoints
//! - `data`: Database layer
//! - `storage`: Object storage for uploaded files
//! - `auth`: Google OAuth authentication
//! - `seed`: Initial catalog seeding
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod metrics;
pub mod seed;
pub mod service;
pub mod storage;

use std::sync::Arc;

use crate::data::Role;

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains
/// shared resources like database pool, object store, and HTTP client.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Lifecycle event bus feeding the SSE endpoints
    pub events: Arc<events::EventBus>,

    /// Object storage for uploaded material files
    pub storage: Arc<dyn storage::ObjectStore>,

    /// HTTP client for the identity provider
    pub http_client: Arc<reqwest::Client>,
}

/// Broadcast buffer for lifecycle events; slow SSE subscribers past
/// this depth get a lag signal and refetch.
const EVENT_BUS_CAPACITY: usize = 256;

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database
    /// 2. Initialize object storage
    /// 3. Elevate bootstrap admin profiles
    /// 4. Seed the catalog (if configured)
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let db = Arc::new(data::Database::connect(&config.database.path).await?);
        tracing::info!("Database connected");

        let storage = storage::build_object_store(&config.storage).await?;
        tracing::info!("Object storage initialized");

        let http_client = reqwest::Client::builder()
            .user_agent("OpenShelf/0.1.0")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;

        Self::bootstrap_admins(&db, &config).await?;

        if config.seed.on_startup {
            seed::ensure_seeded(&db).await?;
        }

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            db,
            events: Arc::new(events::EventBus::new(EVENT_BUS_CAPACITY)),
            storage,
            http_client: Arc::new(http_client),
        })
    }

    /// Elevate configured bootstrap emails to admin.
    ///
    /// Role elevation is out-of-band only; no API mutates roles. A
    /// listed email without a profile yet is elevated on a later
    /// restart, after its first login has created the profile.
    async fn bootstrap_admins(
        db: &data::Database,
        config: &config::AppConfig,
    ) -> Result<(), error::AppError> {
        for email in &config.admin.bootstrap_emails {
            let updated = db.set_profile_role_by_email(email, Role::Admin).await?;
            if updated > 0 {
                tracing::info!(%email, "Bootstrap admin role applied");
            } else {
                tracing::debug!(%email, "Bootstrap admin email has no profile yet");
            }
        }

        Ok(())
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use axum::extract::DefaultBodyLimit;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.server);

    // Multipart slack on top of the file limit for the metadata fields.
    let body_limit = state.config.upload.max_bytes + 64 * 1024;

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(auth::auth_router())
        .nest("/api/v1", api::api_router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(track_http_metrics))
        .layer(cors_layer)
        .with_state(state)
        .merge(api::metrics_router())
}

/// Count every request by method, matched route, and status.
///
/// The matched route template keeps label cardinality bounded; only
/// unmatched (404) requests fall back to the raw path.
async fn track_http_metrics(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use axum::extract::MatchedPath;

    let method = request.method().as_str().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;

    metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &endpoint, response.status().as_str()])
        .inc();

    response
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    if !server.protocol.eq_ignore_ascii_case("https") {
        return CorsLayer::permissive();
    }

    let allowed_origin = server.base_url();
    match HeaderValue::from_str(&allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods(Any)
            .allow_headers(Any),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %allowed_origin,
                "Failed to parse CORS origin from server base URL; denying cross-origin requests"
            );
            CorsLayer::new().allow_methods(Any).allow_headers(Any)
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
