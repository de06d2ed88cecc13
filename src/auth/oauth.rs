//! Google OAuth flow
//!
//! Implements the OAuth 2.0 authorization code flow with Google.
//! Identity and session management live here; the material lifecycle
//! only ever sees the resolved profile.

use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use serde::Deserialize;

use super::middleware::lookup_or_create_profile;
use super::session::{Session, create_session_token};
use crate::AppState;
use crate::error::AppError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const STATE_COOKIE: &str = "oauth_state";
const SESSION_COOKIE: &str = "session";

/// Create authentication router
///
/// Routes:
/// - GET /login - Login page
/// - GET /auth/google - Redirect to Google
/// - GET /auth/google/callback - OAuth callback
/// - POST /logout - Logout
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page))
        .route("/auth/google", get(google_redirect))
        .route("/auth/google/callback", get(google_callback))
        .route("/logout", axum::routing::post(logout))
}

// =============================================================================
// Login Page
// =============================================================================

/// GET /login
///
/// Renders a simple login page with a Google sign-in link.
async fn login_page() -> impl IntoResponse {
    Html(
        r#"
        <!DOCTYPE html>
        <html>
        <head><title>Login - OpenShelf</title></head>
        <body>
            <h1>OpenShelf</h1>
            <p>Please sign in with Google</p>
            <a href="/auth/google">Sign in with Google</a>
        </body>
        </html>
    "#,
    )
}

// =============================================================================
// Google OAuth
// =============================================================================

/// GET /auth/google
///
/// Redirects the user to Google's authorization page.
///
/// # Steps
/// 1. Generate CSRF state token
/// 2. Store state in cookie
/// 3. Redirect to Google with client_id, redirect_uri, scope, state
async fn google_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let csrf_state = generate_csrf_state();

    let mut state_cookie = Cookie::new(STATE_COOKIE, csrf_state.clone());
    state_cookie.set_path("/");
    state_cookie.set_http_only(true);
    state_cookie.set_same_site(SameSite::Lax);
    state_cookie.set_secure(state.config.should_use_secure_cookies());
    let jar = jar.add(state_cookie);

    let redirect_uri = format!("{}/auth/google/callback", state.config.server.base_url());
    let auth_url = url::Url::parse_with_params(
        GOOGLE_AUTH_URL,
        &[
            ("client_id", state.config.auth.google.client_id.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", "openid email profile"),
            ("state", csrf_state.as_str()),
        ],
    )
    .map_err(|e| AppError::Config(format!("invalid OAuth authorize URL: {}", e)))?;

    Ok((jar, Redirect::to(auth_url.as_str())))
}

/// Query parameters from the Google callback
#[derive(Debug, Deserialize)]
struct GoogleCallbackQuery {
    /// Authorization code
    code: String,
    /// CSRF state token
    state: String,
}

/// Google token response
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

/// Google userinfo claims
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    /// Stable subject identifier
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

/// GET /auth/google/callback
///
/// Handles the OAuth callback from Google.
///
/// # Steps
/// 1. Verify CSRF state
/// 2. Exchange code for access token
/// 3. Fetch user info from Google
/// 4. Lookup-or-create the user profile (first login creates it, once)
/// 5. Create session and set cookie
/// 6. Redirect to home
async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    verify_csrf_state(&query.state, &jar)?;

    // Exchange authorization code for an access token
    let redirect_uri = format!("{}/auth/google/callback", state.config.server.base_url());
    let token_response: GoogleTokenResponse = state
        .http_client
        .post(GOOGLE_TOKEN_URL)
        .form(&[
            ("code", query.code.as_str()),
            ("client_id", state.config.auth.google.client_id.as_str()),
            (
                "client_secret",
                state.config.auth.google.client_secret.as_str(),
            ),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    // Fetch identity claims
    let user_info: GoogleUserInfo = state
        .http_client
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(&token_response.access_token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let now = Utc::now();
    let session = Session {
        user_id: user_info.sub,
        email: user_info.email.unwrap_or_default(),
        name: user_info.name,
        created_at: now,
        expires_at: now + Duration::seconds(state.config.auth.session_max_age),
    };

    let profile = lookup_or_create_profile(&state, &session).await?;
    tracing::info!(user_id = %profile.user_id, role = %profile.role, "User signed in");

    let token = create_session_token(&session, &state.config.auth.session_secret)?;

    let mut session_cookie = Cookie::new(SESSION_COOKIE, token);
    session_cookie.set_path("/");
    session_cookie.set_http_only(true);
    session_cookie.set_same_site(SameSite::Lax);
    session_cookie.set_secure(state.config.should_use_secure_cookies());

    let jar = jar
        .remove(Cookie::from(STATE_COOKIE))
        .add(session_cookie);

    Ok((jar, Redirect::to("/")))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /logout
///
/// Clears the session cookie and redirects to login.
async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    (jar, Redirect::to("/login"))
}

// =============================================================================
// Helpers
// =============================================================================

/// Generate a random CSRF state token
fn generate_csrf_state() -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Verify CSRF state from cookie matches callback state
fn verify_csrf_state(callback_state: &str, jar: &CookieJar) -> Result<(), AppError> {
    let cookie_state = jar
        .get(STATE_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or(AppError::Unauthorized)?;

    if cookie_state != callback_state {
        return Err(AppError::Unauthorized);
    }

    Ok(())
}
