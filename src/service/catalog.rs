//! Catalog views: browse, facets, search, and the admin queues
//!
//! Only published materials are visible here. Filtering, faceting, and
//! sorting are pure functions over the published set so their contract
//! can be tested without a database.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::data::{Category, Database, Material, MaterialType};
use crate::error::AppError;

/// Sentinel filter value meaning "no restriction"
const ALL: &str = "all";

/// Browse-time refinements within a category
#[derive(Debug, Clone, Default)]
pub struct BrowseFilter {
    pub material_type: Option<MaterialType>,
    pub subject: Option<String>,
    pub semester: Option<String>,
}

impl BrowseFilter {
    /// Build from raw query text. "All" (any case) and absent both mean
    /// unfiltered; an unknown material type is a validation error.
    pub fn from_query(
        material_type: Option<&str>,
        subject: Option<&str>,
        semester: Option<&str>,
    ) -> Result<Self, AppError> {
        let material_type = match normalize_filter(material_type) {
            Some(text) => Some(MaterialType::parse(&text)?),
            None => None,
        };

        Ok(Self {
            material_type,
            subject: normalize_filter(subject),
            semester: normalize_filter(semester),
        })
    }

    fn matches(&self, material: &Material) -> bool {
        if let Some(ty) = self.material_type {
            if material.material_type != ty {
                return false;
            }
        }
        if let Some(subject) = &self.subject {
            if !material
                .subject
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(subject))
            {
                return false;
            }
        }
        if let Some(semester) = &self.semester {
            if !material
                .semester
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(semester))
            {
                return false;
            }
        }
        true
    }
}

fn normalize_filter(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
        return None;
    }
    Some(value.to_string())
}

/// Facet values derived from the category's full published set.
///
/// Facets are computed before refinement filters are applied, so the
/// dropdowns keep offering every available value while a filter is
/// active.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogFacets {
    pub subjects: Vec<String>,
    pub semesters: Vec<String>,
}

/// One category page: refined materials plus facets from the base set
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub materials: Vec<Material>,
    pub facets: CatalogFacets,
}

/// Newest first. `uploaded_at` descending with missing timestamps last;
/// the sort is stable so records sharing a timestamp keep their
/// insertion order.
pub fn sort_newest_first(materials: &mut [Material]) {
    materials.sort_by_key(|m| std::cmp::Reverse(m.sort_key()));
}

fn collect_facets(materials: &[Material]) -> CatalogFacets {
    let subjects: BTreeSet<String> = materials
        .iter()
        .filter_map(|m| m.subject.clone())
        .collect();
    let semesters: BTreeSet<String> = materials
        .iter()
        .filter_map(|m| m.semester.clone())
        .collect();

    CatalogFacets {
        subjects: subjects.into_iter().collect(),
        semesters: semesters.into_iter().collect(),
    }
}

/// Apply refinements and ordering to a category's published set.
pub fn build_page(mut materials: Vec<Material>, filter: &BrowseFilter) -> CatalogPage {
    sort_newest_first(&mut materials);
    let facets = collect_facets(&materials);
    materials.retain(|m| filter.matches(m));

    CatalogPage { materials, facets }
}

/// Case-insensitive substring match over title, description, subject,
/// and tags. Any field hit qualifies.
pub fn matches_query(material: &Material, query: &str) -> bool {
    let needle = query.to_lowercase();

    if material.title.to_lowercase().contains(&needle)
        || material.description.to_lowercase().contains(&needle)
    {
        return true;
    }
    if let Some(subject) = &material.subject {
        if subject.to_lowercase().contains(&needle) {
            return true;
        }
    }
    material
        .tags
        .iter()
        .any(|tag| tag.to_lowercase().contains(&needle))
}

/// Read-side catalog service
pub struct CatalogService {
    db: Arc<Database>,
}

impl CatalogService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// One category's published materials, refined and newest first.
    pub async fn browse(
        &self,
        category: Category,
        filter: &BrowseFilter,
    ) -> Result<CatalogPage, AppError> {
        let materials = self.db.list_published_by_category(category).await?;
        Ok(build_page(materials, filter))
    }

    /// Search published materials across both categories.
    ///
    /// A blank query is a validation error; no scan happens for it.
    pub async fn search(&self, query: &str) -> Result<Vec<Material>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("search query is required".to_string()));
        }

        let mut results: Vec<Material> = self
            .db
            .list_published()
            .await?
            .into_iter()
            .filter(|m| matches_query(m, query))
            .collect();
        sort_newest_first(&mut results);

        Ok(results)
    }

    /// Admin view: submissions awaiting moderation, newest first.
    pub async fn pending_queue(&self) -> Result<Vec<Material>, AppError> {
        let mut materials = self.db.list_pending().await?;
        sort_newest_first(&mut materials);
        Ok(materials)
    }

    /// Admin view: most recently published materials, capped at `limit`.
    pub async fn recent_published(&self, limit: usize) -> Result<Vec<Material>, AppError> {
        let mut materials = self.db.list_published().await?;
        sort_newest_first(&mut materials);
        materials.truncate(limit);
        Ok(materials)
    }
}
