//! Catalog browsing endpoints

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json,
    routing::get,
};
use serde::Deserialize;

use crate::AppState;
use crate::data::Category;
use crate::error::AppError;
use crate::service::{BrowseFilter, CatalogPage, CatalogService};

use super::stream::stream_catalog;

pub fn catalog_router() -> Router<AppState> {
    Router::new()
        .route("/catalog/:category", get(browse_catalog))
        .route("/catalog/:category/stream", get(stream_catalog))
}

/// Refinement query parameters; "All" or absence means unfiltered
#[derive(Debug, Deserialize)]
struct BrowseQuery {
    #[serde(rename = "type")]
    material_type: Option<String>,
    subject: Option<String>,
    semester: Option<String>,
}

/// GET /api/v1/catalog/:category
///
/// One category's published materials, newest first, with facet values
/// for the subject/semester dropdowns. Facets always reflect the full
/// category so an active filter never empties the other dropdown.
async fn browse_catalog(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<CatalogPage>, AppError> {
    let category = Category::parse(&category)?;
    let filter = BrowseFilter::from_query(
        query.material_type.as_deref(),
        query.subject.as_deref(),
        query.semester.as_deref(),
    )?;

    let service = CatalogService::new(state.db.clone());
    let page = service.browse(category, &filter).await?;

    Ok(Json(page))
}
