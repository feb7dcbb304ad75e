//! Apple Music catalog playlist client
//!
//! Endpoint: `{base}/v1/catalog/{storefront}/playlists/{playlist_id}`
//! Authentication: `Authorization: Bearer <developer token>`
//!
//! The token is supplied at construction (resolved from environment or TOML);
//! it is never part of the source.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{fetch_body, parse_json, trim_base};
use crate::models::{ChartQuery, RawEntry, Source};
use crate::types::{FetchCause, FetchError, SourceAdapter};

pub const APPLE_MUSIC_BASE_URL: &str = "https://api.music.apple.com";

#[derive(Debug, Deserialize)]
struct PlaylistResponse {
    data: Vec<Playlist>,
}

#[derive(Debug, Deserialize)]
struct Playlist {
    relationships: PlaylistRelationships,
}

#[derive(Debug, Deserialize)]
struct PlaylistRelationships {
    tracks: TrackList,
}

#[derive(Debug, Deserialize)]
struct TrackList {
    #[serde(default)]
    data: Vec<SongResource>,
}

#[derive(Debug, Deserialize)]
struct SongResource {
    #[serde(default)]
    attributes: Option<SongAttributes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SongAttributes {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    artist_name: Option<String>,
    #[serde(default)]
    genre_names: Vec<String>,
}

/// Map a playlist body to raw entries, truncated to `limit`
pub fn parse_playlist(body: &str, limit: usize) -> Result<Vec<RawEntry>, FetchError> {
    let response: PlaylistResponse = parse_json(Source::AppleMusicPlaylist, body)?;

    let playlist = response.data.into_iter().next().ok_or_else(|| {
        FetchError::new(
            Source::AppleMusicPlaylist,
            FetchCause::Parse("playlist response has no data".to_string()),
        )
    })?;

    Ok(playlist
        .relationships
        .tracks
        .data
        .into_iter()
        .take(limit)
        .map(|song| {
            let attributes = song.attributes.unwrap_or_default();
            RawEntry {
                rank: None,
                artist: attributes.artist_name,
                title: attributes.name,
                genre: attributes
                    .genre_names
                    .into_iter()
                    .find(|g| !g.eq_ignore_ascii_case("music")),
            }
        })
        .collect())
}

pub struct AppleMusicPlaylistAdapter {
    http_client: Client,
    base_url: String,
    playlist_id: String,
    token: String,
}

impl AppleMusicPlaylistAdapter {
    pub fn new(http_client: Client, base_url: &str, playlist_id: &str, token: String) -> Self {
        Self {
            http_client,
            base_url: trim_base(base_url),
            playlist_id: playlist_id.to_string(),
            token,
        }
    }
}

#[async_trait]
impl SourceAdapter for AppleMusicPlaylistAdapter {
    fn source(&self) -> Source {
        Source::AppleMusicPlaylist
    }

    async fn try_fetch(&self, query: &ChartQuery) -> Result<Vec<RawEntry>, FetchError> {
        if !trf_common::config::is_valid_key(&self.token) {
            return Err(FetchError::new(self.source(), FetchCause::MissingCredential));
        }

        let url = format!(
            "{}/v1/catalog/{}/playlists/{}",
            self.base_url, query.region, self.playlist_id
        );
        tracing::debug!(url = %url, "Querying Apple Music playlist");

        let request = self.http_client.get(&url).bearer_auth(&self.token);
        let body = fetch_body(self.source(), request).await?;

        parse_playlist(&body, query.limit)
    }
}
