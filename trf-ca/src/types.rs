//! Core types and trait definitions for trf-ca
//!
//! Defines the two seams of the chart pipeline:
//! - **SourceAdapter:** one implementation per chart source (fetch → raw entries)
//! - **GenreLookup:** external search-by-text genre lookup used by the enricher
//!
//! Both failure types are fully recovered by their callers: an adapter failure becomes
//! an empty track list plus a reported `FetchError`, a lookup failure becomes the
//! `"Unknown"` genre plus a reported `EnrichmentError`.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{ChartQuery, RawEntry, Source, Track};
use crate::services::normalizer;

// ============================================================================
// Errors
// ============================================================================

/// Why a fetch failed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchCause {
    /// Request exceeded the adapter timeout
    #[error("request timed out")]
    Timeout,

    /// Connection or protocol failure
    #[error("network error: {0}")]
    Transport(String),

    /// Non-2xx HTTP status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Response did not match the expected shape
    #[error("unexpected response shape: {0}")]
    Parse(String),

    /// Adapter requires a credential that was not configured
    #[error("credential not configured")]
    MissingCredential,

    /// Source is disabled or has no registered adapter
    #[error("source not configured")]
    NotConfigured,

    /// Source skipped while its circuit breaker is open
    #[error("source temporarily disabled after repeated failures")]
    CircuitOpen,
}

impl FetchCause {
    /// Classify a reqwest error
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchCause::Timeout
        } else if let Some(status) = err.status() {
            FetchCause::Status(status.as_u16())
        } else if err.is_decode() {
            FetchCause::Parse(err.to_string())
        } else {
            FetchCause::Transport(err.to_string())
        }
    }
}

/// A recovered adapter failure
///
/// Display/Error are written by hand: thiserror would treat a field named
/// `source` as the underlying error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchError {
    pub source: Source,
    pub cause: FetchCause,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not fetch {} ({})", self.source.display_name(), self.cause)
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    pub fn new(source: Source, cause: FetchCause) -> Self {
        Self { source, cause }
    }

    pub fn from_reqwest(source: Source, err: &reqwest::Error) -> Self {
        Self::new(source, FetchCause::from_reqwest(err))
    }
}

/// A recovered genre lookup failure
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Genre lookup failed for '{artist} - {title}': {cause}")]
pub struct EnrichmentError {
    pub artist: String,
    pub title: String,
    pub cause: String,
}

impl EnrichmentError {
    pub fn new(artist: &str, title: &str, cause: impl Into<String>) -> Self {
        Self {
            artist: artist.to_string(),
            title: title.to_string(),
            cause: cause.into(),
        }
    }
}

// ============================================================================
// Source adapter
// ============================================================================

/// Result of one adapter invocation
///
/// `error` is set exactly when the attempt failed; `tracks` is then empty.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub tracks: Vec<Track>,
    pub error: Option<FetchError>,
}

impl FetchOutcome {
    pub fn success(tracks: Vec<Track>) -> Self {
        Self { tracks, error: None }
    }

    pub fn failure(error: FetchError) -> Self {
        Self {
            tracks: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Chart source adapter
///
/// Implementors provide `try_fetch`; callers use `fetch`, which never fails.
/// One attempt per call, no retries.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Source tag stamped on every produced track
    fn source(&self) -> Source;

    /// Fetch raw entries, at most `query.limit`
    async fn try_fetch(&self, query: &ChartQuery) -> Result<Vec<RawEntry>, FetchError>;

    /// Fetch and normalize, converting any failure into an empty outcome
    async fn fetch(&self, query: &ChartQuery) -> FetchOutcome {
        let source = self.source();
        match self.try_fetch(query).await {
            Ok(entries) => {
                let tracks = normalizer::normalize(source, entries);
                debug!(
                    source = %source,
                    region = %query.region,
                    count = tracks.len(),
                    "Fetch successful"
                );
                FetchOutcome::success(tracks)
            }
            Err(e) => {
                warn!(
                    source = %source,
                    region = %query.region,
                    error = %e,
                    "Fetch failed, returning empty result"
                );
                FetchOutcome::failure(e)
            }
        }
    }
}

// ============================================================================
// Genre lookup
// ============================================================================

/// External genre lookup by free text
#[async_trait]
pub trait GenreLookup: Send + Sync {
    /// Lookup name for logs
    fn name(&self) -> &'static str;

    /// Primary genre of the best match, `Ok(None)` when nothing matched
    async fn lookup(&self, artist: &str, title: &str) -> Result<Option<String>, EnrichmentError>;
}
