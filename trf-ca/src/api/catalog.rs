//! Source and category listings
//!
//! Lets a client populate its source checkboxes and category dropdown.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::services::SourceStatus;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub sources: Vec<SourceStatus>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    /// Category labels in rule order, fallback included
    pub categories: Vec<String>,
}

/// GET /api/sources
pub async fn list_sources(State(state): State<AppState>) -> Json<SourcesResponse> {
    Json(SourcesResponse {
        sources: state.service.sources().await,
    })
}

/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state.service.categories().await,
    })
}

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sources", get(list_sources))
        .route("/api/categories", get(list_categories))
}
