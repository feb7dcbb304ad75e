//! Deezer chart API client
//!
//! Endpoint: `{base}/chart/0/tracks?limit={limit}` (public, no authentication)
//!
//! Response shape:
//! ```json
//! {"data": [{"title": "X", "position": 1, "artist": {"name": "Y"}}]}
//! ```
//! The chart is global; the query region is ignored.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{fetch_body, parse_json, trim_base};
use crate::models::{ChartQuery, RawEntry, Source};
use crate::types::{FetchError, SourceAdapter};

pub const DEEZER_BASE_URL: &str = "https://api.deezer.com";

/// Deezer chart response
#[derive(Debug, Deserialize)]
struct DeezerChart {
    data: Vec<DeezerTrack>,
}

#[derive(Debug, Deserialize)]
struct DeezerTrack {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    position: Option<u32>,
    #[serde(default)]
    artist: Option<DeezerArtist>,
}

#[derive(Debug, Deserialize)]
struct DeezerArtist {
    #[serde(default)]
    name: Option<String>,
}

/// Map a Deezer chart body to raw entries, truncated to `limit`
pub fn parse_chart(body: &str, limit: usize) -> Result<Vec<RawEntry>, FetchError> {
    let chart: DeezerChart = parse_json(Source::Deezer, body)?;

    Ok(chart
        .data
        .into_iter()
        .take(limit)
        .map(|track| RawEntry {
            rank: track.position.map(|p| p.to_string()),
            artist: track.artist.and_then(|a| a.name),
            title: track.title,
            genre: None,
        })
        .collect())
}

/// Deezer global chart
pub struct DeezerChartAdapter {
    http_client: Client,
    base_url: String,
}

impl DeezerChartAdapter {
    pub fn new(http_client: Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: trim_base(base_url),
        }
    }
}

#[async_trait]
impl SourceAdapter for DeezerChartAdapter {
    fn source(&self) -> Source {
        Source::Deezer
    }

    async fn try_fetch(&self, query: &ChartQuery) -> Result<Vec<RawEntry>, FetchError> {
        let url = format!("{}/chart/0/tracks", self.base_url);
        tracing::debug!(url = %url, limit = query.limit, "Querying Deezer chart API");

        let request = self
            .http_client
            .get(&url)
            .query(&[("limit", query.limit.to_string())]);
        let body = fetch_body(self.source(), request).await?;

        parse_chart(&body, query.limit)
    }
}
