//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Material
// =============================================================================

/// Top-level grouping for materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    General,
    Academic,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Academic => "Academic",
        }
    }

    /// Parse from stored/user text ("General"/"Academic", case-insensitive)
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "academic" => Ok(Self::Academic),
            other => Err(AppError::Validation(format!(
                "category must be General or Academic, got: {}",
                other
            ))),
        }
    }
}

/// Kind of document a material references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialType {
    Book,
    Story,
    Journal,
    Magazine,
    Article,
    Notes,
    PQs,
    Assignments,
}

impl MaterialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "Book",
            Self::Story => "Story",
            Self::Journal => "Journal",
            Self::Magazine => "Magazine",
            Self::Article => "Article",
            Self::Notes => "Notes",
            Self::PQs => "PQs",
            Self::Assignments => "Assignments",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "book" => Ok(Self::Book),
            "story" => Ok(Self::Story),
            "journal" => Ok(Self::Journal),
            "magazine" => Ok(Self::Magazine),
            "article" => Ok(Self::Article),
            "notes" => Ok(Self::Notes),
            "pqs" => Ok(Self::PQs),
            "assignments" => Ok(Self::Assignments),
            other => Err(AppError::Validation(format!(
                "unknown material type: {}",
                other
            ))),
        }
    }
}

/// A contributed document's metadata
///
/// Lifecycle: created Pending (`approved = false`), Published via admin
/// approve (`approved = true`), or Removed (row deleted, no tombstone).
/// Metadata is immutable after creation except the `approved` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    /// Non-empty title
    pub title: String,
    pub description: String,
    pub material_type: MaterialType,
    pub category: Category,
    /// Required iff category = Academic
    pub subject: Option<String>,
    /// Required iff category = Academic
    pub semester: Option<String>,
    /// Ordered sequence of short text tokens, may be empty
    pub tags: Vec<String>,
    /// URL to the stored file or to an external preview
    pub file_url: String,
    /// Object-store key for the backing file; None for external links
    pub object_key: Option<String>,
    /// Contributor identity (provider subject), informational provenance only
    pub uploaded_by: String,
    pub approved: bool,
    /// Server-assigned; None only for legacy rows, which sort last
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl Material {
    /// Effective sort key: `uploaded_at` descending, missing timestamp
    /// sorts as the oldest (key 0).
    pub fn sort_key(&self) -> i64 {
        self.uploaded_at.map(|t| t.timestamp_millis()).unwrap_or(0)
    }
}

// =============================================================================
// User profiles
// =============================================================================

/// Moderation role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Self {
        // Unknown values degrade to the default role rather than erroring;
        // the row was written out-of-band.
        if s.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }
}

/// One profile per authenticated identity
///
/// Created lazily, exactly once, on first successful authentication.
/// `role` is never mutated in-band beyond the default `user`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    /// Equals the identity provider's user id
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }
}
