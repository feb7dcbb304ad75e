//! Chart query and result types

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::track::Track;
use crate::types::{EnrichmentError, FetchError};

/// Default region when none is requested
pub const DEFAULT_REGION: &str = "us";

/// Default number of entries requested per source
pub const DEFAULT_LIMIT: usize = 25;

/// Parameters of a single adapter fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartQuery {
    /// Lower-cased two-letter country code (storefront)
    pub region: String,
    /// Maximum number of entries to return
    pub limit: usize,
}

impl ChartQuery {
    pub fn new(region: &str, limit: usize) -> Self {
        let region = region.trim().to_ascii_lowercase();
        Self {
            region: if region.is_empty() {
                DEFAULT_REGION.to_string()
            } else {
                region
            },
            limit,
        }
    }
}

impl Default for ChartQuery {
    fn default() -> Self {
        Self::new(DEFAULT_REGION, DEFAULT_LIMIT)
    }
}

/// Adapter output before normalization
///
/// Every field is optional; the normalizer fills gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub rank: Option<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
    /// Genre when the source provides one
    pub genre: Option<String>,
}

impl RawEntry {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: Some(artist.into()),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_rank(mut self, rank: impl Into<String>) -> Self {
        self.rank = Some(rank.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }
}

/// Merged, enriched result of one refresh
#[derive(Debug, Clone, Serialize)]
pub struct ChartSnapshot {
    pub tracks: Vec<Track>,
    pub fetch_errors: Vec<FetchError>,
    pub enrichment_errors: Vec<EnrichmentError>,
    pub fetched_at: DateTime<Utc>,
}

impl ChartSnapshot {
    /// User-visible warnings for every recovered failure
    pub fn warnings(&self) -> Vec<String> {
        self.fetch_errors
            .iter()
            .map(|e| e.to_string())
            .chain(self.enrichment_errors.iter().map(|e| e.to_string()))
            .collect()
    }
}
