//! Outbound search links (video search, stream search)

use reqwest::Url;
use std::collections::BTreeMap;

use crate::models::{LinkKind, Track};

const VIDEO_SEARCH_URL: &str = "https://www.youtube.com/results";
const STREAM_SEARCH_URL: &str = "https://open.spotify.com/search";

/// Build URL-encoded search links for "{artist} {title}"
pub fn search_links(track: &Track) -> BTreeMap<LinkKind, String> {
    let query = track.search_query();
    let mut links = BTreeMap::new();

    if query.is_empty() {
        return links;
    }

    if let Some(url) = video_search_url(&query) {
        links.insert(LinkKind::VideoSearch, url);
    }
    if let Some(url) = stream_search_url(&query) {
        links.insert(LinkKind::StreamSearch, url);
    }

    links
}

fn video_search_url(query: &str) -> Option<String> {
    Url::parse_with_params(VIDEO_SEARCH_URL, &[("search_query", query)])
        .ok()
        .map(String::from)
}

fn stream_search_url(query: &str) -> Option<String> {
    let mut url = Url::parse(STREAM_SEARCH_URL).ok()?;
    url.path_segments_mut().ok()?.push(query);
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;

    #[test]
    fn test_links_are_encoded() {
        let track = Track::new(1, "Beyoncé & Jay", "Crazy in Love?", Source::Deezer);
        let links = search_links(&track);

        let video = &links[&LinkKind::VideoSearch];
        assert!(video.starts_with("https://www.youtube.com/results?search_query="));
        assert!(!video.contains(' '));
        assert!(video.contains("%26"));

        let stream = &links[&LinkKind::StreamSearch];
        assert!(stream.starts_with("https://open.spotify.com/search/"));
        assert!(!stream.contains(' '));
        assert!(stream.contains("%3F"));
    }

    #[test]
    fn test_empty_track_has_no_links() {
        let track = Track::new(1, "", "", Source::Deezer);
        assert!(search_links(&track).is_empty());
    }
}
