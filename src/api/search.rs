//! Catalog search endpoint

use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use serde::Deserialize;

use crate::AppState;
use crate::data::Material;
use crate::error::AppError;
use crate::metrics::SEARCHES_TOTAL;
use crate::service::CatalogService;

pub fn search_router() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// GET /api/v1/search?q=...
///
/// Case-insensitive substring search over published materials in both
/// categories. A blank query is a validation error.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Material>>, AppError> {
    let service = CatalogService::new(state.db.clone());
    let results = service.search(&query.q).await?;

    SEARCHES_TOTAL.inc();

    Ok(Json(results))
}
