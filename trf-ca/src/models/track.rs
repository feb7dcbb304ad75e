//! Track record shared by every stage of the chart pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::services::remix_mapper::RemixMapper;

/// Genre placeholder used until enrichment finds a real one
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Origin adapter of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    /// kworb.net TikTok chart table (markup scrape)
    #[serde(rename = "kworb")]
    KworbTikTok,
    /// TikTok chart mirror table (markup scrape)
    #[serde(rename = "tokchart")]
    TokChart,
    /// Deezer chart API (JSON)
    #[serde(rename = "deezer")]
    Deezer,
    /// Apple marketing RSS feed (JSON)
    #[serde(rename = "apple_rss")]
    AppleRss,
    /// Apple Music catalog playlist (JSON, bearer token)
    #[serde(rename = "apple_music")]
    AppleMusicPlaylist,
}

impl Source {
    /// All known sources in default fetch order
    pub const ALL: [Source; 5] = [
        Source::KworbTikTok,
        Source::TokChart,
        Source::Deezer,
        Source::AppleRss,
        Source::AppleMusicPlaylist,
    ];

    /// Stable lowercase id used in config, cache keys and query strings
    pub fn id(&self) -> &'static str {
        match self {
            Source::KworbTikTok => "kworb",
            Source::TokChart => "tokchart",
            Source::Deezer => "deezer",
            Source::AppleRss => "apple_rss",
            Source::AppleMusicPlaylist => "apple_music",
        }
    }

    /// Human-readable name for warnings
    pub fn display_name(&self) -> &'static str {
        match self {
            Source::KworbTikTok => "TikTok (kworb)",
            Source::TokChart => "TikTok (tokchart)",
            Source::Deezer => "Deezer",
            Source::AppleRss => "Apple Music RSS",
            Source::AppleMusicPlaylist => "Apple Music playlist",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Source::ALL
            .iter()
            .copied()
            .find(|source| source.id() == wanted)
            .ok_or_else(|| format!("unknown source '{}'", s.trim()))
    }
}

/// Kind of outbound search link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Video search (YouTube)
    VideoSearch,
    /// Streaming search (Spotify)
    StreamSearch,
}

/// Remix target: category plus tempo range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSuggestion {
    pub category: String,
    pub bpm_min: u16,
    pub bpm_max: u16,
}

impl TagSuggestion {
    pub fn new(category: impl Into<String>, bpm_min: u16, bpm_max: u16) -> Self {
        Self {
            category: category.into(),
            bpm_min,
            bpm_max,
        }
    }

    /// Display label, e.g. "House (120–128 BPM)"
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// True if `selection` names this category or its full label (case-insensitive)
    pub fn matches(&self, selection: &str) -> bool {
        let selection = selection.trim();
        self.category.eq_ignore_ascii_case(selection) || self.label().eq_ignore_ascii_case(selection)
    }
}

impl fmt::Display for TagSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}–{} BPM)", self.category, self.bpm_min, self.bpm_max)
    }
}

/// A chart entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Source-provided ordinal (not unique across merged sources)
    pub rank: u32,
    pub artist: String,
    pub title: String,
    pub source: Source,
    pub genre: String,
    /// Set by the enricher
    pub tag_suggestion: Option<TagSuggestion>,
    #[serde(default)]
    pub external_links: BTreeMap<LinkKind, String>,
}

impl Track {
    pub fn new(rank: u32, artist: impl Into<String>, title: impl Into<String>, source: Source) -> Self {
        Self {
            rank,
            artist: artist.into(),
            title: title.into(),
            source,
            genre: UNKNOWN_GENRE.to_string(),
            tag_suggestion: None,
            external_links: BTreeMap::new(),
        }
    }

    /// Deduplication identity: lower-cased (artist, title)
    pub fn identity_key(&self) -> (String, String) {
        (self.artist.to_lowercase(), self.title.to_lowercase())
    }

    /// Free-text query used for genre lookup and outbound search links
    pub fn search_query(&self) -> String {
        format!("{} {}", self.artist, self.title).trim().to_string()
    }

    pub fn has_known_genre(&self) -> bool {
        let genre = self.genre.trim();
        !genre.is_empty() && !genre.eq_ignore_ascii_case(UNKNOWN_GENRE)
    }

    /// Re-derive the tag under a (possibly changed) mapping policy
    pub fn retag(&mut self, mapper: &RemixMapper) {
        self.tag_suggestion = Some(mapper.suggest(&self.genre));
    }
}
