//! kworb.net TikTok chart (markup scrape)
//!
//! Endpoint: `{base}/charts/tiktok/{region}.html`

use async_trait::async_trait;
use reqwest::Client;

use super::html_table::parse_chart_table;
use super::{fetch_body, trim_base};
use crate::models::{ChartQuery, RawEntry, Source};
use crate::types::{FetchCause, FetchError, SourceAdapter};

pub const KWORB_BASE_URL: &str = "https://kworb.net";

/// TikTok trending chart scraped from kworb.net
pub struct KworbTikTokAdapter {
    http_client: Client,
    base_url: String,
}

impl KworbTikTokAdapter {
    pub fn new(http_client: Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: trim_base(base_url),
        }
    }

    fn chart_url(&self, query: &ChartQuery) -> String {
        format!("{}/charts/tiktok/{}.html", self.base_url, query.region)
    }
}

#[async_trait]
impl SourceAdapter for KworbTikTokAdapter {
    fn source(&self) -> Source {
        Source::KworbTikTok
    }

    async fn try_fetch(&self, query: &ChartQuery) -> Result<Vec<RawEntry>, FetchError> {
        let url = self.chart_url(query);
        tracing::debug!(url = %url, "Fetching kworb TikTok chart");

        let body = fetch_body(self.source(), self.http_client.get(&url)).await?;

        parse_chart_table(&body, query.limit)
            .map_err(|e| FetchError::new(self.source(), FetchCause::Parse(e)))
    }
}
