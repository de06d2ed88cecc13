//! Material lifecycle / moderation engine
//!
//! The rules governing how a Material moves from submitted to published
//! or removed, who may act on it, and what holds at each state:
//!
//! - Submit (any authenticated user): file persisted to the object
//!   store first, then the metadata record, created `approved = false`.
//!   Submissions require admin approval before they are catalog-visible.
//! - Approve (admin): publishes a pending record. Idempotent — retrying
//!   on an already-approved record is a no-op, retrying after a
//!   concurrent delete fails with NotFound instead of resurrecting it.
//! - Reject (admin, pending) / Delete (admin, any state): removes the
//!   metadata record first, then the backing file. No tombstone.
//!
//! Metadata is immutable after creation except the `approved` flag.

use std::sync::Arc;

use chrono::Utc;

use crate::data::{Category, Database, EntityId, Material, MaterialType, UserProfile};
use crate::error::AppError;
use crate::events::{EventBus, MaterialEvent};
use crate::metrics::MATERIALS_TOTAL;
use crate::storage::{ObjectStore, material_object_key};

/// Content types accepted for uploaded files
const ALLOWED_CONTENT_TYPES: &[&str] = &["application/pdf"];

/// Submission input: everything the contributor provides except the file
#[derive(Debug, Clone)]
pub struct MaterialDraft {
    pub title: String,
    pub description: String,
    pub material_type: MaterialType,
    pub category: Category,
    pub subject: Option<String>,
    pub semester: Option<String>,
    pub tags: Vec<String>,
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).is_some_and(|s| !s.is_empty())
}

/// Validate and normalize a draft.
///
/// Academic materials require subject and semester; General materials
/// carry neither (any provided values are dropped, not stored).
pub fn validate_draft(draft: &MaterialDraft) -> Result<MaterialDraft, AppError> {
    let mut draft = draft.clone();

    if draft.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }

    match draft.category {
        Category::Academic => {
            if !non_empty(&draft.subject) || !non_empty(&draft.semester) {
                return Err(AppError::Validation(
                    "subject and semester are required for academic materials".to_string(),
                ));
            }
        }
        Category::General => {
            draft.subject = None;
            draft.semester = None;
        }
    }

    draft.title = draft.title.trim().to_string();
    draft.tags = draft
        .tags
        .iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    Ok(draft)
}

fn check_content_type(content_type: &str) -> Result<(), AppError> {
    if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
        return Err(AppError::InvalidFile(format!(
            "unsupported content type: {} (PDF only)",
            content_type
        )));
    }
    Ok(())
}

fn require_admin(actor: &UserProfile) -> Result<(), AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Material lifecycle service
pub struct MaterialService {
    db: Arc<Database>,
    storage: Arc<dyn ObjectStore>,
    events: Arc<EventBus>,
}

impl MaterialService {
    pub fn new(db: Arc<Database>, storage: Arc<dyn ObjectStore>, events: Arc<EventBus>) -> Self {
        Self { db, storage, events }
    }

    // =========================================================================
    // Submit
    // =========================================================================

    /// Submit a new material with an uploaded file.
    ///
    /// The file is persisted first so a metadata record never references
    /// a missing object. If the metadata write fails afterwards the
    /// uploaded file is left behind as accepted garbage; catalog views
    /// never see a dangling record.
    ///
    /// # Errors
    /// - `InvalidFile` if the content type is not allowed
    /// - `Validation` if the draft violates the category invariant
    pub async fn submit(
        &self,
        draft: &MaterialDraft,
        file: Vec<u8>,
        content_type: &str,
        actor: &UserProfile,
    ) -> Result<Material, AppError> {
        check_content_type(content_type)?;
        let draft = validate_draft(draft)?;

        if file.is_empty() {
            return Err(AppError::InvalidFile("uploaded file is empty".to_string()));
        }

        let id = EntityId::new().0;
        let key = material_object_key(&id);

        // Object store write must complete before the metadata write.
        let file_url = self.storage.upload(&key, file, content_type).await?;

        let material = self
            .insert_record(&draft, id, file_url, Some(key), actor)
            .await?;

        Ok(material)
    }

    /// Submit a material that references an external document URL
    /// (no file upload).
    pub async fn submit_link(
        &self,
        draft: &MaterialDraft,
        file_url: &str,
        actor: &UserProfile,
    ) -> Result<Material, AppError> {
        let draft = validate_draft(draft)?;

        let parsed = url::Url::parse(file_url)
            .map_err(|_| AppError::Validation("file_url must be a valid URL".to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Validation(
                "file_url must use http or https".to_string(),
            ));
        }

        let id = EntityId::new().0;
        let material = self
            .insert_record(&draft, id, file_url.to_string(), None, actor)
            .await?;

        Ok(material)
    }

    async fn insert_record(
        &self,
        draft: &MaterialDraft,
        id: String,
        file_url: String,
        object_key: Option<String>,
        actor: &UserProfile,
    ) -> Result<Material, AppError> {
        let material = Material {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            material_type: draft.material_type,
            category: draft.category,
            subject: draft.subject.clone(),
            semester: draft.semester.clone(),
            tags: draft.tags.clone(),
            file_url,
            object_key,
            uploaded_by: actor.user_id.clone(),
            // Submissions enter the pending queue; only an admin
            // approve publishes them.
            approved: false,
            uploaded_at: Some(Utc::now()),
        };

        if let Err(error) = self.db.insert_material(&material).await {
            if let Some(key) = &material.object_key {
                tracing::warn!(
                    object_key = %key,
                    "Metadata write failed after upload; orphan file left for sweep"
                );
            }
            return Err(error);
        }

        MATERIALS_TOTAL.inc();
        tracing::info!(
            material_id = %material.id,
            category = material.category.as_str(),
            uploaded_by = %material.uploaded_by,
            "Material submitted"
        );
        self.events.publish(MaterialEvent::submitted(&material));

        Ok(material)
    }

    // =========================================================================
    // Moderation
    // =========================================================================

    /// Publish a pending material.
    ///
    /// Idempotent: approving an already-approved record is a no-op
    /// success. Approving a record that no longer exists returns
    /// `NotFound` — a concurrent delete wins the race.
    pub async fn approve(&self, id: &str, actor: &UserProfile) -> Result<(), AppError> {
        require_admin(actor)?;

        let touched = self.db.set_material_approved(id).await?;
        if touched == 0 {
            return Err(AppError::NotFound);
        }

        // The row may be deleted between the update and this read; the
        // transition itself already succeeded, so only skip the event.
        if let Some(material) = self.db.get_material(id).await? {
            tracing::info!(material_id = %id, admin = %actor.user_id, "Material approved");
            self.events.publish(MaterialEvent::published(&material));
        }

        Ok(())
    }

    /// Reject a pending submission: remove the record and its file.
    ///
    /// Rejecting an already-published record is an `InvalidState` error;
    /// use `delete` for those. A second reject after success yields
    /// `NotFound`, which callers treat as already satisfied.
    pub async fn reject(&self, id: &str, actor: &UserProfile) -> Result<(), AppError> {
        require_admin(actor)?;

        let material = self.db.get_material(id).await?.ok_or(AppError::NotFound)?;
        if material.approved {
            return Err(AppError::InvalidState(
                "material is already published; delete it instead".to_string(),
            ));
        }

        self.remove(material, actor, "rejected").await
    }

    /// Remove a material in any state: record first, then file.
    pub async fn delete(&self, id: &str, actor: &UserProfile) -> Result<(), AppError> {
        require_admin(actor)?;

        let material = self.db.get_material(id).await?.ok_or(AppError::NotFound)?;
        self.remove(material, actor, "deleted").await
    }

    /// Shared removal path.
    ///
    /// The metadata row goes first: a record surviving without its file
    /// would show a broken item in catalog views, while an orphaned
    /// file is invisible garbage. A failed file delete is logged for
    /// manual reconciliation instead of failing the action.
    async fn remove(
        &self,
        material: Material,
        actor: &UserProfile,
        action: &'static str,
    ) -> Result<(), AppError> {
        let deleted = self.db.delete_material(&material.id).await?;
        if deleted == 0 {
            // Another admin removed it first.
            return Err(AppError::NotFound);
        }
        MATERIALS_TOTAL.dec();

        if let Some(key) = &material.object_key {
            if let Err(error) = self.storage.delete(key).await {
                tracing::error!(
                    material_id = %material.id,
                    object_key = %key,
                    %error,
                    "Material file cleanup failed; orphan left for manual reconciliation"
                );
            }
        }

        tracing::info!(material_id = %material.id, admin = %actor.user_id, "Material {}", action);
        self.events
            .publish(MaterialEvent::removed(&material.id, material.category));

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Point lookup for the viewer page.
    pub async fn get(&self, id: &str) -> Result<Material, AppError> {
        self.db.get_material(id).await?.ok_or(AppError::NotFound)
    }
}
