//! iTunes Search API genre lookup
//!
//! Endpoint: `{base}/search?term={artist title}&limit=1`
//!
//! Takes the first result's `primaryGenreName`. The public API allows roughly
//! 20 requests per minute, enforced here with a token bucket.

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;

use crate::types::{EnrichmentError, GenreLookup};

pub const ITUNES_BASE_URL: &str = "https://itunes.apple.com";

/// Default request budget per minute
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 20;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    #[serde(default)]
    primary_genre_name: Option<String>,
}

/// Genre lookup backed by the iTunes Search API
pub struct ItunesGenreLookup {
    http_client: Client,
    base_url: String,
    rate_limiter: DefaultDirectRateLimiter,
}

impl ItunesGenreLookup {
    /// Create a lookup client
    ///
    /// `http_client` carries the lookup timeout; `requests_per_minute` of 0 is treated as 1.
    pub fn new(http_client: Client, base_url: &str, requests_per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);

        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
        }
    }
}

/// First result's primary genre, if any
pub fn parse_search_response(body: &str) -> Result<Option<String>, serde_json::Error> {
    let response: SearchResponse = serde_json::from_str(body)?;

    Ok(response
        .results
        .into_iter()
        .next()
        .and_then(|r| r.primary_genre_name)
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty()))
}

#[async_trait]
impl GenreLookup for ItunesGenreLookup {
    fn name(&self) -> &'static str {
        "iTunes"
    }

    async fn lookup(&self, artist: &str, title: &str) -> Result<Option<String>, EnrichmentError> {
        let term = format!("{} {}", artist, title).trim().to_string();
        if term.is_empty() {
            return Ok(None);
        }

        // Wait for a permit from the token bucket
        self.rate_limiter.until_ready().await;

        let url = format!("{}/search", self.base_url);
        tracing::debug!(term = %term, "Querying iTunes search API");

        let response = self
            .http_client
            .get(&url)
            .query(&[("term", term.as_str()), ("limit", "1")])
            .send()
            .await
            .map_err(|e| EnrichmentError::new(artist, title, format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::new(
                artist,
                title,
                format!("HTTP status {}", status.as_u16()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| EnrichmentError::new(artist, title, format!("read failed: {}", e)))?;

        let genre = parse_search_response(&body)
            .map_err(|e| EnrichmentError::new(artist, title, format!("parse failed: {}", e)))?;

        tracing::debug!(
            artist = %artist,
            title = %title,
            genre = genre.as_deref().unwrap_or("Unknown"),
            "iTunes lookup complete"
        );

        Ok(genre)
    }
}
