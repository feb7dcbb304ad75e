//! Chart source adapters
//!
//! One adapter per external source. Each implements `SourceAdapter` from the
//! `types` module and reports failures as `FetchError` instead of raising.
//!
//! # Extraction strategies
//! - **Structured API:** `deezer`, `apple_rss`, `apple_music` parse a known JSON shape
//! - **Markup scrape:** `kworb`, `tokchart` read the first HTML table via `html_table`
//!
//! Every adapter takes its base URL at construction so it can be pointed at a
//! mirror or a local fixture server.

pub mod apple_music;
pub mod apple_rss;
pub mod deezer;
pub mod html_table;
pub mod kworb;
pub mod tokchart;

pub use apple_music::AppleMusicPlaylistAdapter;
pub use apple_rss::AppleRssAdapter;
pub use deezer::DeezerChartAdapter;
pub use kworb::KworbTikTokAdapter;
pub use tokchart::TokChartAdapter;

use reqwest::{Client, RequestBuilder};
use std::time::Duration;

use crate::models::Source;
use crate::types::{FetchCause, FetchError};

/// Build the HTTP client shared by adapters
///
/// The timeout applies to the whole request (connect + body).
pub fn build_http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(trf_common::config::user_agent())
        .timeout(timeout)
        .build()
}

/// Send a GET and return the body text of a 2xx response
pub(crate) async fn fetch_body(source: Source, request: RequestBuilder) -> Result<String, FetchError> {
    let response = request
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(source, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::new(source, FetchCause::Status(status.as_u16())));
    }

    response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(source, &e))
}

/// Deserialize a JSON body, mapping shape mismatches to `FetchCause::Parse`
pub(crate) fn parse_json<T>(source: Source, body: &str) -> Result<T, FetchError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| FetchError::new(source, FetchCause::Parse(e.to_string())))
}

/// Strip a trailing slash so paths can be appended with `format!`
pub(crate) fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
