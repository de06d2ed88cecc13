//! Material submission and viewing endpoints

use axum::{
    Router,
    extract::{Multipart, Path, State},
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::{CurrentUser, MaybeUser};
use crate::data::{Category, Material, MaterialType};
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, MATERIAL_UPLOADS_TOTAL};
use crate::service::{MaterialDraft, MaterialService};

pub fn materials_router() -> Router<AppState> {
    Router::new()
        .route("/materials", post(submit_material))
        .route("/materials/link", post(submit_link))
        .route("/materials/:id", get(get_material))
}

/// Metadata fields shared by both submission endpoints, as raw text
#[derive(Debug, Default)]
struct DraftFields {
    title: Option<String>,
    description: Option<String>,
    material_type: Option<String>,
    category: Option<String>,
    subject: Option<String>,
    semester: Option<String>,
    tags: Option<String>,
}

impl DraftFields {
    fn into_draft(self) -> Result<MaterialDraft, AppError> {
        let title = self
            .title
            .ok_or_else(|| AppError::Validation("title is required".to_string()))?;
        let material_type = self
            .material_type
            .ok_or_else(|| AppError::Validation("type is required".to_string()))?;
        let category = self
            .category
            .ok_or_else(|| AppError::Validation("category is required".to_string()))?;

        Ok(MaterialDraft {
            title,
            description: self.description.unwrap_or_default(),
            material_type: MaterialType::parse(&material_type)?,
            category: Category::parse(&category)?,
            subject: self.subject,
            semester: self.semester,
            tags: parse_tags(self.tags.as_deref()),
        })
    }
}

/// Tags arrive as one comma-separated field; blanks are dropped later
/// by draft validation.
fn parse_tags(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// POST /api/v1/materials
///
/// Multipart submission: metadata fields plus a `file` part. The file
/// is size-checked while streaming so an oversized upload is rejected
/// without buffering the whole body.
async fn submit_material(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<Material>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/api/v1/materials"])
        .start_timer();

    let max_bytes = state.config.upload.max_bytes;

    let mut fields = DraftFields::default();
    let mut file_data: Option<Vec<u8>> = None;
    let mut content_type: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to parse multipart: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let detected = field
                    .content_type()
                    .map(|s| s.to_string())
                    .ok_or_else(|| {
                        AppError::Validation(
                            "Missing content type for uploaded file".to_string(),
                        )
                    })?;

                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {}", e)))?
                {
                    if bytes.len() + chunk.len() > max_bytes {
                        return Err(AppError::Validation(format!(
                            "File too large: exceeds {} bytes",
                            max_bytes
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }

                content_type = Some(detected);
                file_data = Some(bytes);
            }
            "title" => fields.title = Some(read_text(field).await?),
            "description" => fields.description = Some(read_text(field).await?),
            "type" => fields.material_type = Some(read_text(field).await?),
            "category" => fields.category = Some(read_text(field).await?),
            "subject" => fields.subject = Some(read_text(field).await?),
            "semester" => fields.semester = Some(read_text(field).await?),
            "tags" => fields.tags = Some(read_text(field).await?),
            _ => {}
        }
    }

    let draft = fields.into_draft()?;
    let file_data =
        file_data.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    let content_type = content_type
        .ok_or_else(|| AppError::Validation("Missing content type for uploaded file".to_string()))?;

    let service = MaterialService::new(
        state.db.clone(),
        state.storage.clone(),
        state.events.clone(),
    );
    let material = service
        .submit(&draft, file_data, &content_type, &user.profile)
        .await?;

    MATERIAL_UPLOADS_TOTAL.inc();

    Ok(Json(material))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read field: {}", e)))
}

/// JSON body for link-only submissions
#[derive(Debug, Deserialize)]
struct SubmitLinkRequest {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type")]
    material_type: String,
    category: String,
    subject: Option<String>,
    semester: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    file_url: String,
}

/// POST /api/v1/materials/link
///
/// Submit a material that references an externally hosted document.
async fn submit_link(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<SubmitLinkRequest>,
) -> Result<Json<Material>, AppError> {
    let draft = MaterialDraft {
        title: request.title,
        description: request.description,
        material_type: MaterialType::parse(&request.material_type)?,
        category: Category::parse(&request.category)?,
        subject: request.subject,
        semester: request.semester,
        tags: request.tags,
    };

    let service = MaterialService::new(
        state.db.clone(),
        state.storage.clone(),
        state.events.clone(),
    );
    let material = service
        .submit_link(&draft, &request.file_url, &user.profile)
        .await?;

    MATERIAL_UPLOADS_TOTAL.inc();

    Ok(Json(material))
}

/// GET /api/v1/materials/:id
///
/// Point lookup backing the document viewer. Pending records resolve
/// only for admins (submission preview); everyone else gets NotFound,
/// the same answer as for an id that never existed.
async fn get_material(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<Material>, AppError> {
    let service = MaterialService::new(
        state.db.clone(),
        state.storage.clone(),
        state.events.clone(),
    );
    let material = service.get(&id).await?;

    if !material.approved && !user.as_ref().is_some_and(|u| u.is_admin()) {
        return Err(AppError::NotFound);
    }

    Ok(Json(material))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_split_on_commas_and_drop_blanks() {
        assert_eq!(
            parse_tags(Some("physics, einstein , ,science")),
            vec!["physics", "einstein", "science"]
        );
        assert!(parse_tags(None).is_empty());
        assert!(parse_tags(Some("  ")).is_empty());
    }

    #[test]
    fn draft_requires_title_type_and_category() {
        let fields = DraftFields {
            title: Some("t".to_string()),
            material_type: Some("Book".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            fields.into_draft(),
            Err(AppError::Validation(msg)) if msg.contains("category")
        ));
    }
}
