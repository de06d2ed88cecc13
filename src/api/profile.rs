//! Profile endpoint

use axum::{Router, response::Json, routing::get};

use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::UserProfile;
use crate::error::AppError;

pub fn profile_router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile))
}

/// GET /api/v1/profile
///
/// The authenticated user's stored profile, including the role the
/// frontend uses to show or hide the admin UI. Authorization itself is
/// enforced server-side regardless.
async fn get_profile(CurrentUser(user): CurrentUser) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(user.profile))
}
