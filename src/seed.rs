//! Initial catalog seeding
//!
//! Inserts a handful of sample materials so a fresh deployment has a
//! browsable catalog. Runs at most once per database: a marker row in
//! the settings table guards the insert, so restarts and concurrent
//! instances racing at startup cannot duplicate the samples.

use std::sync::Arc;

use chrono::Utc;

use crate::data::{Category, Database, EntityId, Material, MaterialType};
use crate::error::AppError;
use crate::metrics::MATERIALS_TOTAL;

const SEED_MARKER_KEY: &str = "catalog_seeded";

/// Known-good PDF host used where the canonical source is unreliable
/// behind CORS.
const RELIABLE_PDF: &str =
    "https://raw.githubusercontent.com/mozilla/pdf.js/ba2edeae/web/compressed.tracemonkey-pldi-09.pdf";

const SEED_UPLOADER: &str = "system_seeder";

struct SampleBook {
    title: &'static str,
    description: &'static str,
    material_type: MaterialType,
    category: Category,
    subject: Option<&'static str>,
    semester: Option<&'static str>,
    tags: &'static [&'static str],
    file_url: &'static str,
}

const SAMPLE_BOOKS: &[SampleBook] = &[
    SampleBook {
        title: "Pride and Prejudice",
        description: "The famous novel by Jane Austen, following the turbulent relationship between Elizabeth Bennet and Fitzwilliam Darcy.",
        material_type: MaterialType::Book,
        category: Category::General,
        subject: None,
        semester: None,
        tags: &["classic", "romance", "literature"],
        file_url: RELIABLE_PDF,
    },
    SampleBook {
        title: "JavaScript for Impatient Programmers",
        description: "A comprehensive guide to modern JavaScript.",
        material_type: MaterialType::Book,
        category: Category::Academic,
        subject: Some("Computer Science"),
        semester: Some("Shared"),
        tags: &["programming", "javascript", "coding"],
        file_url: RELIABLE_PDF,
    },
    SampleBook {
        title: "The Theory of Relativity",
        description: "Key papers on the special and general theory of relativity.",
        material_type: MaterialType::Article,
        category: Category::Academic,
        subject: Some("Physics"),
        semester: Some("Research"),
        tags: &["physics", "science", "einstein"],
        file_url: "https://upload.wikimedia.org/wikipedia/commons/d/d3/Einstein_Relativity.pdf",
    },
];

/// Seed the catalog with sample materials if it has never been seeded.
///
/// Sample records are inserted already published; they bypass the
/// moderation queue because no contributor submitted them.
/// Returns true if this call performed the seeding.
pub async fn ensure_seeded(db: &Arc<Database>) -> Result<bool, AppError> {
    let claimed = db
        .set_setting_if_absent(SEED_MARKER_KEY, &Utc::now().to_rfc3339())
        .await?;
    if !claimed {
        tracing::debug!("Catalog already seeded, skipping");
        return Ok(false);
    }

    for book in SAMPLE_BOOKS {
        let material = Material {
            id: EntityId::new().0,
            title: book.title.to_string(),
            description: book.description.to_string(),
            material_type: book.material_type,
            category: book.category,
            subject: book.subject.map(str::to_string),
            semester: book.semester.map(str::to_string),
            tags: book.tags.iter().map(|t| t.to_string()).collect(),
            file_url: book.file_url.to_string(),
            object_key: None,
            uploaded_by: SEED_UPLOADER.to_string(),
            approved: true,
            uploaded_at: Some(Utc::now()),
        };
        db.insert_material(&material).await?;
        MATERIALS_TOTAL.inc();
    }

    tracing::info!(count = SAMPLE_BOOKS.len(), "Catalog seeded with sample materials");
    Ok(true)
}
