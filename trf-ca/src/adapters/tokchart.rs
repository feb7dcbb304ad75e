//! TikTok chart mirror (markup scrape)
//!
//! Endpoint: `{base}/?country={REGION}`; same table layout as kworb.

use async_trait::async_trait;
use reqwest::Client;

use super::html_table::parse_chart_table;
use super::{fetch_body, trim_base};
use crate::models::{ChartQuery, RawEntry, Source};
use crate::types::{FetchCause, FetchError, SourceAdapter};

pub const TOKCHART_BASE_URL: &str = "https://tokchart.com";

pub struct TokChartAdapter {
    http_client: Client,
    base_url: String,
}

impl TokChartAdapter {
    pub fn new(http_client: Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: trim_base(base_url),
        }
    }
}

#[async_trait]
impl SourceAdapter for TokChartAdapter {
    fn source(&self) -> Source {
        Source::TokChart
    }

    async fn try_fetch(&self, query: &ChartQuery) -> Result<Vec<RawEntry>, FetchError> {
        let url = format!("{}/", self.base_url);
        let country = query.region.to_ascii_uppercase();
        tracing::debug!(url = %url, country = %country, "Fetching TikTok chart mirror");

        let request = self.http_client.get(&url).query(&[("country", country.as_str())]);
        let body = fetch_body(self.source(), request).await?;

        parse_chart_table(&body, query.limit)
            .map_err(|e| FetchError::new(self.source(), FetchCause::Parse(e)))
    }
}
