//! Admin moderation API
//!
//! Every handler re-checks the admin role from the stored profile; the
//! role in a stale session token is never trusted.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
};

use crate::AppState;
use crate::auth::{AuthUser, CurrentUser};
use crate::data::Material;
use crate::error::AppError;
use crate::metrics::MODERATION_ACTIONS_TOTAL;
use crate::seed::ensure_seeded;
use crate::service::{CatalogService, MaterialService};

/// Most recently published records shown in the admin dashboard
const RECENT_PUBLISHED_LIMIT: usize = 50;

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/pending", get(list_pending))
        .route("/approved", get(list_approved))
        .route("/materials/:id/approve", post(approve_material))
        .route("/materials/:id/reject", post(reject_material))
        .route("/materials/:id", delete(delete_material))
        .route("/seed", post(seed_catalog))
}

fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

fn material_service(state: &AppState) -> MaterialService {
    MaterialService::new(
        state.db.clone(),
        state.storage.clone(),
        state.events.clone(),
    )
}

/// GET /api/v1/admin/pending
///
/// The moderation queue, newest first.
async fn list_pending(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Material>>, AppError> {
    require_admin(&user)?;

    let service = CatalogService::new(state.db.clone());
    let materials = service.pending_queue().await?;

    Ok(Json(materials))
}

/// GET /api/v1/admin/approved
///
/// The most recently published materials.
async fn list_approved(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Material>>, AppError> {
    require_admin(&user)?;

    let service = CatalogService::new(state.db.clone());
    let materials = service.recent_published(RECENT_PUBLISHED_LIMIT).await?;

    Ok(Json(materials))
}

/// POST /api/v1/admin/materials/:id/approve
async fn approve_material(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    material_service(&state).approve(&id, &user.profile).await?;
    MODERATION_ACTIONS_TOTAL.with_label_values(&["approve"]).inc();

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/materials/:id/reject
async fn reject_material(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    material_service(&state).reject(&id, &user.profile).await?;
    MODERATION_ACTIONS_TOTAL.with_label_values(&["reject"]).inc();

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/materials/:id
async fn delete_material(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    material_service(&state).delete(&id, &user.profile).await?;
    MODERATION_ACTIONS_TOTAL.with_label_values(&["delete"]).inc();

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/seed
///
/// Seed the catalog with sample materials. Safe to call repeatedly; a
/// marker row makes it a no-op after the first run.
async fn seed_catalog(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&user)?;

    let seeded = ensure_seeded(&state.db).await?;

    Ok(Json(serde_json::json!({ "seeded": seeded })))
}
