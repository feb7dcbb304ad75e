//! trf-ca library interface
//!
//! Chart aggregation microservice: fetches several public music charts,
//! normalizes and merges them, and suggests a remix category per track.
//! Exposed as a library so integration tests can drive the router and
//! the pipeline directly.

pub mod adapters;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::models::ChartQuery;
use crate::services::ChartService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChartService>,
    /// Region and limit used when a request omits them
    pub defaults: ChartQuery,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last fetch warning for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(service: ChartService, defaults: ChartQuery) -> Self {
        Self {
            service: Arc::new(service),
            defaults,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::chart_routes())
        .merge(api::catalog_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
