//! Filter / rank engine
//!
//! Read-only views over an enriched track list:
//! - keyword filter (case-insensitive substring of artist + title)
//! - category sort (stable partition, selected remix category first)

use serde::Deserialize;

use crate::models::Track;

/// User view selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ViewOptions {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ViewOptions {
    /// Keyword filter, then category sort
    pub fn apply(&self, tracks: Vec<Track>) -> Vec<Track> {
        let filtered = filter_keyword(tracks, self.keyword.as_deref().unwrap_or(""));
        sort_by_category(filtered, self.category.as_deref())
    }
}

/// Keep tracks whose artist + title contains `keyword` (case-insensitive)
///
/// An empty keyword returns the input unchanged.
pub fn filter_keyword(tracks: Vec<Track>, keyword: &str) -> Vec<Track> {
    if keyword.is_empty() {
        return tracks;
    }

    let needle = keyword.to_lowercase();
    tracks
        .into_iter()
        .filter(|track| matches_keyword(track, &needle))
        .collect()
}

fn matches_keyword(track: &Track, needle: &str) -> bool {
    let artist = track.artist.to_lowercase();
    let title = track.title.to_lowercase();

    format!("{}{}", artist, title).contains(needle)
        || format!("{} {}", artist, title).contains(needle)
}

/// Stable-partition tracks so those tagged with `category` come first
///
/// Relative order inside each partition is kept. `None` or a blank
/// selection returns the input unchanged.
pub fn sort_by_category(tracks: Vec<Track>, category: Option<&str>) -> Vec<Track> {
    let Some(selection) = category.map(str::trim).filter(|c| !c.is_empty()) else {
        return tracks;
    };

    let (mut selected, rest): (Vec<Track>, Vec<Track>) =
        tracks.into_iter().partition(|track| {
            track
                .tag_suggestion
                .as_ref()
                .is_some_and(|tag| tag.matches(selection))
        });

    selected.extend(rest);
    selected
}
