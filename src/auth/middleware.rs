//! Authentication extractors
//!
//! Resolve the session cookie/bearer token to an authenticated user
//! and their profile. The profile carries the authoritative role, so
//! admin checks in the service layer reject unauthorized actors even
//! if a UI forgot to hide a button.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use super::session::{Session, verify_session_token};
use crate::AppState;
use crate::data::{Role, UserProfile};
use crate::error::AppError;

/// Authenticated identity plus its stored profile
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub session: Session,
    pub profile: UserProfile,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.profile.is_admin()
    }
}

fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
        .or_else(|| {
            let jar = CookieJar::from_headers(headers);
            jar.get("session").map(|cookie| cookie.value().to_owned())
        })
}

/// Load the profile for a session, creating it on first sight.
///
/// Creation happens exactly once per identity: `INSERT OR IGNORE`
/// resolves the race between two concurrent first requests, and the
/// follow-up read returns whichever row won.
pub async fn lookup_or_create_profile(
    state: &AppState,
    session: &Session,
) -> Result<UserProfile, AppError> {
    if let Some(profile) = state.db.get_profile(&session.user_id).await? {
        return Ok(profile);
    }

    let profile = UserProfile {
        user_id: session.user_id.clone(),
        name: session
            .name
            .clone()
            .or_else(|| session.email.split('@').next().map(str::to_string))
            .unwrap_or_else(|| "User".to_string()),
        email: session.email.clone(),
        role: Role::User.as_str().to_string(),
        created_at: Utc::now(),
    };

    let created = state.db.insert_profile_if_absent(&profile).await?;
    if created {
        tracing::info!(user_id = %profile.user_id, "User profile created");
        return Ok(profile);
    }

    // Lost the creation race; read the winner.
    state
        .db
        .get_profile(&session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)
}

async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<AuthUser, AppError> {
    let token = extract_token_from_headers(headers).ok_or(AppError::Unauthorized)?;
    let session = verify_session_token(&token, &state.config.auth.session_secret)?;
    let profile = lookup_or_create_profile(state, &session).await?;

    Ok(AuthUser { session, profile })
}

/// Extractor for the current authenticated user
///
/// # Usage
/// ```ignore
/// async fn handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}", user.profile.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>().cloned() {
            return Ok(CurrentUser(user));
        }

        let app_state = AppState::from_ref(state);
        let user = authenticate(&parts.headers, &app_state).await?;
        parts.extensions.insert(user.clone());

        Ok(CurrentUser(user))
    }
}

/// Optional current user extractor
///
/// Returns None if not authenticated, instead of error.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>().cloned() {
            return Ok(MaybeUser(Some(user)));
        }

        let app_state = AppState::from_ref(state);
        let user = authenticate(&parts.headers, &app_state).await.ok();

        if let Some(user) = &user {
            parts.extensions.insert(user.clone());
        }

        Ok(MaybeUser(user))
    }
}
