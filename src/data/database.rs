//! SQLite database operations
//!
//! All database access goes through this module.
//! Uses SQLx with a connection pool; migrations run at connect time.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper
pub struct Database {
    pool: Pool<Sqlite>,
}

/// Raw materials row; `tags` is stored as a JSON array of strings and
/// category/type as their display text.
#[derive(Debug, sqlx::FromRow)]
struct MaterialRow {
    id: String,
    title: String,
    description: String,
    material_type: String,
    category: String,
    subject: Option<String>,
    semester: Option<String>,
    tags: String,
    file_url: String,
    object_key: Option<String>,
    uploaded_by: String,
    approved: bool,
    uploaded_at: Option<DateTime<Utc>>,
}

impl TryFrom<MaterialRow> for Material {
    type Error = AppError;

    fn try_from(row: MaterialRow) -> Result<Self, AppError> {
        let tags: Vec<String> = serde_json::from_str(&row.tags)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt tags column: {}", e)))?;
        let material_type = MaterialType::parse(&row.material_type)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("corrupt material_type column")))?;
        let category = Category::parse(&row.category)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("corrupt category column")))?;

        Ok(Material {
            id: row.id,
            title: row.title,
            description: row.description,
            material_type,
            category,
            subject: row.subject,
            semester: row.semester,
            tags,
            file_url: row.file_url,
            object_key: row.object_key,
            uploaded_by: row.uploaded_by,
            approved: row.approved,
            uploaded_at: row.uploaded_at,
        })
    }
}

fn rows_to_materials(rows: Vec<MaterialRow>) -> Result<Vec<Material>, AppError> {
    rows.into_iter().map(Material::try_from).collect()
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Materials
    // =========================================================================

    pub async fn insert_material(&self, material: &Material) -> Result<(), AppError> {
        let tags = serde_json::to_string(&material.tags)
            .map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO materials
                (id, title, description, material_type, category, subject,
                 semester, tags, file_url, object_key, uploaded_by, approved,
                 uploaded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&material.id)
        .bind(&material.title)
        .bind(&material.description)
        .bind(material.material_type.as_str())
        .bind(material.category.as_str())
        .bind(&material.subject)
        .bind(&material.semester)
        .bind(&tags)
        .bind(&material.file_url)
        .bind(&material.object_key)
        .bind(&material.uploaded_by)
        .bind(material.approved)
        .bind(material.uploaded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_material(&self, id: &str) -> Result<Option<Material>, AppError> {
        let row = sqlx::query_as::<_, MaterialRow>("SELECT * FROM materials WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Material::try_from).transpose()
    }

    /// Mark a material approved.
    ///
    /// Returns the number of rows touched: 0 means the row no longer
    /// exists (a concurrent delete won). Approving an already-approved
    /// row still touches it, which makes the operation idempotent.
    pub async fn set_material_approved(&self, id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE materials SET approved = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete a material row.
    ///
    /// Returns the number of rows deleted; 0 means another caller
    /// removed it first.
    pub async fn delete_material(&self, id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM materials WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Published materials in one category, in insertion order.
    pub async fn list_published_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<Material>, AppError> {
        let rows = sqlx::query_as::<_, MaterialRow>(
            "SELECT * FROM materials WHERE category = ? AND approved = 1 ORDER BY rowid",
        )
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows_to_materials(rows)
    }

    /// All published materials regardless of category, in insertion order.
    /// Full scan; the search path filters by substring in memory.
    pub async fn list_published(&self) -> Result<Vec<Material>, AppError> {
        let rows = sqlx::query_as::<_, MaterialRow>(
            "SELECT * FROM materials WHERE approved = 1 ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows_to_materials(rows)
    }

    /// Pending queue: submitted but not yet approved, in insertion order.
    pub async fn list_pending(&self) -> Result<Vec<Material>, AppError> {
        let rows = sqlx::query_as::<_, MaterialRow>(
            "SELECT * FROM materials WHERE approved = 0 ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows_to_materials(rows)
    }

    pub async fn count_materials(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM materials")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // User profiles
    // =========================================================================

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        let profile =
            sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(profile)
    }

    /// Create a profile if none exists for this identity.
    ///
    /// `INSERT OR IGNORE` on the primary key is the uniqueness guard
    /// against two concurrent first-time logins; exactly one wins.
    /// Returns true if the row was created by this call.
    pub async fn insert_profile_if_absent(&self, profile: &UserProfile) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO user_profiles (user_id, name, email, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.user_id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.role)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Out-of-band role elevation (startup bootstrap only).
    pub async fn set_profile_role_by_email(
        &self,
        email: &str,
        role: Role,
    ) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE user_profiles SET role = ? WHERE email = ?")
            .bind(role.as_str())
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Write a one-shot marker; returns false if it was already set.
    /// Backs the check-then-act guard for idempotent seeding.
    pub async fn set_setting_if_absent(&self, key: &str, value: &str) -> Result<bool, AppError> {
        let result = sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
