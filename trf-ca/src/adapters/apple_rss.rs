//! Apple marketing RSS feed (most-played songs)
//!
//! Endpoint: `{base}/api/v2/{region}/music/most-played/{limit}/songs.json`
//!
//! Response shape:
//! ```json
//! {"feed": {"results": [{"name": "X", "artistName": "Y", "genres": [{"name": "Pop"}]}]}}
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{fetch_body, parse_json, trim_base};
use crate::models::{ChartQuery, RawEntry, Source};
use crate::types::{FetchError, SourceAdapter};

pub const APPLE_RSS_BASE_URL: &str = "https://rss.applemarketingtools.com";

#[derive(Debug, Deserialize)]
struct RssDocument {
    feed: RssFeed,
}

#[derive(Debug, Deserialize)]
struct RssFeed {
    #[serde(default)]
    results: Vec<RssSong>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RssSong {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    artist_name: Option<String>,
    #[serde(default)]
    genres: Vec<RssGenre>,
}

#[derive(Debug, Deserialize)]
struct RssGenre {
    name: String,
}

/// Map an RSS feed body to raw entries, truncated to `limit`
///
/// The first listed genre is carried through; "Music" is Apple's catch-all and is dropped.
pub fn parse_feed(body: &str, limit: usize) -> Result<Vec<RawEntry>, FetchError> {
    let document: RssDocument = parse_json(Source::AppleRss, body)?;

    Ok(document
        .feed
        .results
        .into_iter()
        .take(limit)
        .map(|song| RawEntry {
            rank: None,
            artist: song.artist_name,
            title: song.name,
            genre: song
                .genres
                .into_iter()
                .map(|g| g.name)
                .find(|g| !g.eq_ignore_ascii_case("music")),
        })
        .collect())
}

pub struct AppleRssAdapter {
    http_client: Client,
    base_url: String,
}

impl AppleRssAdapter {
    pub fn new(http_client: Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: trim_base(base_url),
        }
    }
}

#[async_trait]
impl SourceAdapter for AppleRssAdapter {
    fn source(&self) -> Source {
        Source::AppleRss
    }

    async fn try_fetch(&self, query: &ChartQuery) -> Result<Vec<RawEntry>, FetchError> {
        let url = format!(
            "{}/api/v2/{}/music/most-played/{}/songs.json",
            self.base_url, query.region, query.limit
        );
        tracing::debug!(url = %url, "Fetching Apple RSS feed");

        let body = fetch_body(self.source(), self.http_client.get(&url)).await?;
        parse_feed(&body, query.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"{"feed":{"title":"Top Songs","results":[
        {"artistName":"Sabrina Carpenter","name":"Espresso","genres":[{"genreId":"14","name":"Pop"},{"genreId":"34","name":"Music"}]},
        {"artistName":"Kendrick Lamar","name":"Not Like Us","genres":[{"genreId":"34","name":"Music"},{"genreId":"18","name":"Hip-Hop/Rap"}]},
        {"artistName":"Nobody","name":"Untagged"}
    ]}}"#;

    #[test]
    fn test_parse_feed_maps_fields() {
        let entries = parse_feed(FEED, 10).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0],
            RawEntry::new("Sabrina Carpenter", "Espresso").with_genre("Pop")
        );
        assert_eq!(entries[1].genre.as_deref(), Some("Hip-Hop/Rap"));
        assert_eq!(entries[2].genre, None);
    }

    #[test]
    fn test_parse_feed_limit() {
        assert_eq!(parse_feed(FEED, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_feed_is_error() {
        assert!(parse_feed(r#"{"results":[]}"#, 5).is_err());
    }
}
