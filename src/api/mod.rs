//! API layer
//!
//! HTTP handlers for:
//! - Material submission and viewing
//! - Catalog browsing, live updates (SSE), and search
//! - Admin moderation API
//! - Metrics (Prometheus)

mod admin;
mod catalog;
mod materials;
pub mod metrics;
mod profile;
mod search;
mod stream;

use axum::Router;

use crate::AppState;

pub use metrics::metrics_router;

/// Full API surface, nested under /api/v1 (admin under /api/v1/admin)
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(materials::materials_router())
        .merge(catalog::catalog_router())
        .merge(search::search_router())
        .merge(profile::profile_router())
        .nest("/admin", admin::admin_router())
}
