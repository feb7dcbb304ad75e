//! Genre/Tag enricher
//!
//! Two deterministic policies, applied in order:
//! 1. **Lookup** (optional): tracks whose genre is still "Unknown" get the primary
//!    genre from an external `GenreLookup`. Failures fall back to "Unknown" and are
//!    reported, never raised. Successful lookups are memoised per (artist, title).
//! 2. **Heuristic mapping**: the genre is mapped to a remix target by `RemixMapper`.
//!
//! `enrich_all` runs a bounded worker pool and keeps input order. Concurrent
//! lookups of the same (artist, title) share one request.

use futures::future::{BoxFuture, FutureExt, Shared};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::models::{Track, UNKNOWN_GENRE};
use crate::services::remix_mapper::RemixMapper;
use crate::services::ttl_cache::TtlCache;
use crate::types::{EnrichmentError, GenreLookup};

/// Default number of concurrent lookups
pub const DEFAULT_WORKERS: usize = 4;

type GenreKey = (String, String);
type PendingLookup = Shared<BoxFuture<'static, Result<Option<String>, EnrichmentError>>>;

pub struct Enricher {
    lookup: Option<Arc<dyn GenreLookup>>,
    mapper: RwLock<RemixMapper>,
    genre_cache: TtlCache<GenreKey, String>,
    /// Lookups currently on the wire, keyed like `genre_cache`
    pending: Mutex<HashMap<GenreKey, PendingLookup>>,
    workers: usize,
}

impl Enricher {
    pub fn new(
        lookup: Option<Arc<dyn GenreLookup>>,
        mapper: RemixMapper,
        genre_ttl: Duration,
        workers: usize,
    ) -> Self {
        Self {
            lookup,
            mapper: RwLock::new(mapper),
            genre_cache: TtlCache::new(genre_ttl),
            pending: Mutex::new(HashMap::new()),
            workers: workers.max(1),
        }
    }

    /// Mapping-only enricher (no network lookups)
    pub fn mapping_only(mapper: RemixMapper) -> Self {
        Self::new(None, mapper, Duration::from_secs(0), 1)
    }

    pub async fn mapper(&self) -> RemixMapper {
        self.mapper.read().await.clone()
    }

    /// Replace the mapping policy; callers re-derive cached tags afterwards
    pub async fn set_mapper(&self, mapper: RemixMapper) {
        *self.mapper.write().await = mapper;
    }

    /// Enrich one track
    pub async fn enrich(&self, mut track: Track) -> (Track, Option<EnrichmentError>) {
        let mut error = None;

        if !track.has_known_genre() {
            if let Some(lookup) = &self.lookup {
                match self.lookup_genre(lookup, &track).await {
                    Ok(genre) => track.genre = genre,
                    Err(e) => {
                        tracing::warn!(
                            lookup = lookup.name(),
                            error = %e,
                            "Genre lookup failed, using Unknown"
                        );
                        track.genre = UNKNOWN_GENRE.to_string();
                        error = Some(e);
                    }
                }
            }
        }

        track.retag(&*self.mapper.read().await);
        (track, error)
    }

    /// Enrich a list over the worker pool, preserving order
    pub async fn enrich_all(&self, tracks: Vec<Track>) -> (Vec<Track>, Vec<EnrichmentError>) {
        let results: Vec<(Track, Option<EnrichmentError>)> = stream::iter(tracks)
            .map(|track| self.enrich(track))
            .buffered(self.workers)
            .collect()
            .await;

        let mut enriched = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for (track, error) in results {
            enriched.push(track);
            errors.extend(error);
        }

        tracing::debug!(
            tracks = enriched.len(),
            failures = errors.len(),
            "Enrichment pass complete"
        );

        (enriched, errors)
    }

    async fn lookup_genre(
        &self,
        lookup: &Arc<dyn GenreLookup>,
        track: &Track,
    ) -> Result<String, EnrichmentError> {
        let key = track.identity_key();
        if let Some(genre) = self.genre_cache.get(&key).await {
            return Ok(genre);
        }

        let (pending, owner) = {
            let mut in_flight = self.pending.lock().await;
            match in_flight.get(&key) {
                Some(pending) => (pending.clone(), false),
                None => {
                    let lookup = Arc::clone(lookup);
                    let artist = track.artist.clone();
                    let title = track.title.clone();
                    let pending = async move { lookup.lookup(&artist, &title).await }
                        .boxed()
                        .shared();
                    in_flight.insert(key.clone(), pending.clone());
                    (pending, true)
                }
            }
        };

        if !owner {
            tracing::trace!(artist = %track.artist, title = %track.title, "Joining in-flight lookup");
        }

        let result = pending
            .await
            .map(|genre| genre.unwrap_or_else(|| UNKNOWN_GENRE.to_string()));

        if owner {
            // Cache before releasing the key so late arrivals hit the cache
            if let Ok(genre) = &result {
                self.genre_cache.insert(key.clone(), genre.clone()).await;
            }
            self.pending.lock().await.remove(&key);
        }

        result
    }
}
