//! Normalizer: adapter output → common Track shape
//!
//! Never fails. Missing ranks become the positional index + 1, missing
//! artist/title become empty strings, missing genres become "Unknown".

use crate::models::{RawEntry, Source, Track, UNKNOWN_GENRE};
use crate::services::links;

/// Convert raw adapter entries into tracks, preserving order
pub fn normalize(source: Source, entries: Vec<RawEntry>) -> Vec<Track> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| normalize_entry(source, index, entry))
        .collect()
}

fn normalize_entry(source: Source, index: usize, entry: RawEntry) -> Track {
    let positional = u32::try_from(index + 1).unwrap_or(u32::MAX);
    let rank = entry
        .rank
        .as_deref()
        .and_then(parse_rank)
        .unwrap_or(positional);

    let artist = clean(entry.artist);
    let title = clean(entry.title);

    let mut track = Track::new(rank, artist, title, source);
    track.genre = entry
        .genre
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| UNKNOWN_GENRE.to_string());
    track.external_links = links::search_links(&track);
    track
}

fn clean(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Parse the leading digits of a rank cell ("1", "12.", "#3 (+2)")
///
/// Zero is not a valid rank.
pub fn parse_rank(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .trim_start_matches('#')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse::<u32>().ok().filter(|rank| *rank > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkKind;

    #[test]
    fn test_missing_rank_is_positional() {
        let tracks = normalize(
            Source::Deezer,
            vec![RawEntry::new("A", "One"), RawEntry::new("B", "Two")],
        );
        assert_eq!(tracks[0].rank, 1);
        assert_eq!(tracks[1].rank, 2);
    }

    #[test]
    fn test_source_rank_kept() {
        let tracks = normalize(
            Source::KworbTikTok,
            vec![RawEntry::new("A", "One").with_rank("17")],
        );
        assert_eq!(tracks[0].rank, 17);
    }

    #[test]
    fn test_unparsable_rank_is_positional() {
        let tracks = normalize(
            Source::KworbTikTok,
            vec![
                RawEntry::new("A", "One").with_rank("n/a"),
                RawEntry::new("B", "Two").with_rank("0"),
            ],
        );
        assert_eq!(tracks[0].rank, 1);
        assert_eq!(tracks[1].rank, 2);
    }

    #[test]
    fn test_parse_rank_variants() {
        assert_eq!(parse_rank("12."), Some(12));
        assert_eq!(parse_rank("#3 (+2)"), Some(3));
        assert_eq!(parse_rank(" 4 "), Some(4));
        assert_eq!(parse_rank("-"), None);
        assert_eq!(parse_rank(""), None);
    }

    #[test]
    fn test_absent_fields_become_empty() {
        let tracks = normalize(Source::Deezer, vec![RawEntry::default()]);
        assert_eq!(tracks[0].artist, "");
        assert_eq!(tracks[0].title, "");
        assert_eq!(tracks[0].genre, UNKNOWN_GENRE);
    }

    #[test]
    fn test_source_genre_carried_and_trimmed() {
        let tracks = normalize(
            Source::AppleRss,
            vec![
                RawEntry::new("A", "One").with_genre(" Pop "),
                RawEntry::new("B", "Two").with_genre("  "),
            ],
        );
        assert_eq!(tracks[0].genre, "Pop");
        assert_eq!(tracks[1].genre, UNKNOWN_GENRE);
    }

    #[test]
    fn test_links_attached() {
        let tracks = normalize(Source::Deezer, vec![RawEntry::new("Y", "X")]);
        assert!(tracks[0].external_links.contains_key(&LinkKind::VideoSearch));
        assert!(tracks[0].external_links.contains_key(&LinkKind::StreamSearch));
    }
}
