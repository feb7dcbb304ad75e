//! Aggregator / deduplicator
//!
//! Unions per-source track lists and drops later duplicates keyed on
//! lower-cased (artist, title). First-seen order is kept.

use std::collections::HashSet;

use crate::models::Track;

/// Concatenate `lists` and remove later duplicates (stable)
pub fn merge<I>(lists: I) -> Vec<Track>
where
    I: IntoIterator<Item = Vec<Track>>,
{
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut merged = Vec::new();

    for track in lists.into_iter().flatten() {
        if seen.insert(track.identity_key()) {
            merged.push(track);
        } else {
            tracing::trace!(
                artist = %track.artist,
                title = %track.title,
                source = %track.source,
                "Dropping duplicate track"
            );
        }
    }

    merged
}
