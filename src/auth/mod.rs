//! Google OAuth authentication
//!
//! Handles:
//! - Google OAuth flow
//! - Session management
//! - Authentication extractors and profile resolution

mod middleware;
mod oauth;
pub mod session;

pub use middleware::{AuthUser, CurrentUser, MaybeUser, lookup_or_create_profile};
pub use oauth::auth_router;
pub use session::{Session, create_session_token, verify_session_token};
