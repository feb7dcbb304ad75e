//! Chart endpoints
//!
//! - `GET /api/charts`: cached-or-fresh merged chart, filtered and ranked for display
//! - `POST /api/charts/refresh`: same, but bypasses the chart cache
//! - `DELETE /api/charts/cache`: drop cached charts without refetching
//!
//! Fetch and enrichment failures never fail the request; they come back as
//! `warnings` next to whatever tracks were obtained.

use axum::{
    extract::{Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::MAX_LIMIT;
use crate::models::{ChartQuery, Source, Track};
use crate::services::{RefreshRequest, ViewOptions};
use crate::{ApiError, ApiResult, AppState};

/// Query string of `GET /api/charts`
#[derive(Debug, Default, Deserialize)]
pub struct ChartParams {
    /// Comma-separated source ids; empty means every registered source
    pub sources: Option<String>,
    pub region: Option<String>,
    pub limit: Option<usize>,
    pub keyword: Option<String>,
    pub category: Option<String>,
}

/// JSON body of `POST /api/charts/refresh`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RefreshBody {
    pub sources: Option<Vec<String>>,
    pub region: Option<String>,
    pub limit: Option<usize>,
    pub keyword: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChartsResponse {
    pub tracks: Vec<Track>,
    pub warnings: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

/// GET /api/charts
pub async fn get_charts(
    State(state): State<AppState>,
    Query(params): Query<ChartParams>,
) -> ApiResult<Json<ChartsResponse>> {
    let ids: Vec<&str> = params
        .sources
        .as_deref()
        .unwrap_or("")
        .split(',')
        .collect();

    let request = build_request(
        &state,
        &ids,
        params.region.as_deref(),
        params.limit,
        false,
    )?;
    let view = ViewOptions {
        keyword: params.keyword,
        category: params.category,
    };

    Ok(Json(run(&state, &request, &view).await))
}

/// POST /api/charts/refresh
pub async fn refresh_charts(
    State(state): State<AppState>,
    body: Option<Json<RefreshBody>>,
) -> ApiResult<Json<ChartsResponse>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let ids: Vec<&str> = body
        .sources
        .iter()
        .flatten()
        .map(String::as_str)
        .collect();

    let request = build_request(&state, &ids, body.region.as_deref(), body.limit, true)?;
    info!(
        sources = request.sources.len(),
        region = %request.query.region,
        "Manual chart refresh requested"
    );

    let view = ViewOptions {
        keyword: body.keyword,
        category: body.category,
    };

    Ok(Json(run(&state, &request, &view).await))
}

/// Query string of `DELETE /api/charts/cache`
#[derive(Debug, Default, Deserialize)]
pub struct InvalidateParams {
    /// Comma-separated source ids; empty means every registered source
    pub sources: Option<String>,
    pub region: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    /// Number of cached source charts dropped
    pub invalidated: usize,
}

/// DELETE /api/charts/cache
///
/// Without `region` and `limit` every cached chart of the selected sources is
/// dropped; with either, only that region/limit (the other taking its default).
pub async fn invalidate_cache(
    State(state): State<AppState>,
    Query(params): Query<InvalidateParams>,
) -> ApiResult<Json<InvalidateResponse>> {
    let ids: Vec<&str> = params
        .sources
        .as_deref()
        .unwrap_or("")
        .split(',')
        .collect();

    let scoped = params.region.is_some() || params.limit.is_some();
    let request = build_request(
        &state,
        &ids,
        params.region.as_deref(),
        params.limit,
        false,
    )?;

    let query = scoped.then_some(&request.query);
    let invalidated = state.service.invalidate(&request.sources, query).await;

    Ok(Json(InvalidateResponse { invalidated }))
}

async fn run(state: &AppState, request: &RefreshRequest, view: &ViewOptions) -> ChartsResponse {
    let snapshot = state.service.refresh(request).await;
    let warnings = snapshot.warnings();

    if let Some(last) = snapshot.fetch_errors.last() {
        *state.last_error.write().await = Some(last.to_string());
    }

    ChartsResponse {
        tracks: view.apply(snapshot.tracks),
        warnings,
        fetched_at: snapshot.fetched_at,
    }
}

fn build_request(
    state: &AppState,
    ids: &[&str],
    region: Option<&str>,
    limit: Option<usize>,
    force: bool,
) -> ApiResult<RefreshRequest> {
    let mut sources = parse_sources(ids)?;
    if sources.is_empty() {
        sources = state.service.default_sources();
    }

    let limit = limit.unwrap_or(state.defaults.limit);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }

    let region = region.unwrap_or(state.defaults.region.as_str());
    if !region.trim().is_empty() && !is_region_code(region.trim()) {
        return Err(ApiError::BadRequest(format!(
            "region must be a two-letter country code, got '{}'",
            region
        )));
    }

    Ok(RefreshRequest {
        sources,
        query: ChartQuery::new(region, limit),
        force,
    })
}

/// Parse source ids, skipping blanks and duplicates
///
/// An unknown id is a client error.
pub fn parse_sources(ids: &[&str]) -> ApiResult<Vec<Source>> {
    let mut sources = Vec::new();
    for id in ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
        let source = id.parse::<Source>().map_err(ApiError::BadRequest)?;
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    Ok(sources)
}

fn is_region_code(region: &str) -> bool {
    region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn chart_routes() -> Router<AppState> {
    Router::new()
        .route("/api/charts", get(get_charts))
        .route("/api/charts/refresh", post(refresh_charts))
        .route("/api/charts/cache", delete(invalidate_cache))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources() {
        assert_eq!(
            parse_sources(&["deezer", " kworb ", "", "DEEZER"]).unwrap(),
            vec![Source::Deezer, Source::KworbTikTok]
        );
        assert!(parse_sources(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_parse_sources_rejects_unknown() {
        assert!(matches!(
            parse_sources(&["deezer", "napster"]),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_region_code() {
        assert!(is_region_code("US"));
        assert!(is_region_code("gb"));
        assert!(!is_region_code("usa"));
        assert!(!is_region_code("1x"));
    }
}
