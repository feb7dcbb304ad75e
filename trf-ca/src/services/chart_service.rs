//! Chart service: fetch → normalize → enrich → cache → merge
//!
//! Owns the adapter registry, one circuit breaker per source, the chart cache
//! and the enricher. Each refresh fetches the requested sources concurrently,
//! enriches fresh results, and merges them in request order.
//!
//! # Caching
//! Enriched per-source lists are cached under `(source, region, limit)`.
//! Failed fetches are never cached, so a transient outage does not pin an
//! empty chart for the whole TTL. Successful empty results are cached.

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{
    build_http_client, AppleMusicPlaylistAdapter, AppleRssAdapter, DeezerChartAdapter,
    KworbTikTokAdapter, TokChartAdapter,
};
use crate::config::CaConfig;
use crate::models::{ChartQuery, ChartSnapshot, Source, Track};
use crate::services::aggregator;
use crate::services::circuit_breaker::{BreakerState, CircuitBreaker};
use crate::services::enricher::Enricher;
use crate::services::itunes_client::ItunesGenreLookup;
use crate::services::remix_mapper::RemixMapper;
use crate::services::ttl_cache::TtlCache;
use crate::types::{EnrichmentError, FetchCause, FetchError, GenreLookup, SourceAdapter};

type ChartKey = (Source, String, usize);

/// One user refresh action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    /// Sources to fetch, merged in this order
    pub sources: Vec<Source>,
    pub query: ChartQuery,
    /// Bypass and replace cached entries
    pub force: bool,
}

/// Registered source with its breaker state
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub id: Source,
    pub name: &'static str,
    pub breaker: BreakerState,
}

/// Circuit breaker parameters applied to every source
#[derive(Debug, Clone, Copy)]
pub struct BreakerSettings {
    pub failure_threshold: u32,
    pub cooldown: Duration,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(60),
        }
    }
}

struct SourceResult {
    tracks: Vec<Track>,
    fetch_error: Option<FetchError>,
    enrichment_errors: Vec<EnrichmentError>,
}

impl SourceResult {
    fn failed(error: FetchError) -> Self {
        Self {
            tracks: Vec::new(),
            fetch_error: Some(error),
            enrichment_errors: Vec::new(),
        }
    }
}

/// Chart aggregation service
pub struct ChartService {
    adapters: HashMap<Source, Arc<dyn SourceAdapter>>,
    breakers: HashMap<Source, CircuitBreaker>,
    cache: TtlCache<ChartKey, Vec<Track>>,
    enricher: Enricher,
}

impl ChartService {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        enricher: Enricher,
        chart_ttl: Duration,
        breaker: BreakerSettings,
    ) -> Self {
        let adapters: HashMap<Source, Arc<dyn SourceAdapter>> = adapters
            .into_iter()
            .map(|adapter| (adapter.source(), adapter))
            .collect();

        let breakers = adapters
            .keys()
            .map(|source| {
                (
                    *source,
                    CircuitBreaker::new(breaker.failure_threshold, breaker.cooldown),
                )
            })
            .collect();

        Self {
            adapters,
            breakers,
            cache: TtlCache::new(chart_ttl),
            enricher,
        }
    }

    /// Build adapters, lookup and enricher from configuration
    pub fn from_config(config: &CaConfig) -> trf_common::Result<Self> {
        let fetch_client = build_http_client(config.http.fetch_timeout())
            .map_err(|e| trf_common::Error::Internal(format!("HTTP client: {}", e)))?;

        let sources = &config.sources;
        let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

        for source in sources.enabled_sources()? {
            let client = fetch_client.clone();
            let adapter: Arc<dyn SourceAdapter> = match source {
                Source::KworbTikTok => Arc::new(KworbTikTokAdapter::new(client, &sources.kworb_base_url)),
                Source::TokChart => Arc::new(TokChartAdapter::new(client, &sources.tokchart_base_url)),
                Source::Deezer => Arc::new(DeezerChartAdapter::new(client, &sources.deezer_base_url)),
                Source::AppleRss => Arc::new(AppleRssAdapter::new(client, &sources.apple_rss_base_url)),
                Source::AppleMusicPlaylist => {
                    let (Some(token), Some(playlist_id)) = (
                        config.resolve_apple_music_token(),
                        sources.apple_music_playlist_id.as_deref(),
                    ) else {
                        tracing::warn!(
                            "Apple Music needs {} and sources.apple_music_playlist_id; source not registered",
                            crate::config::APPLE_MUSIC_TOKEN_ENV_VAR
                        );
                        continue;
                    };
                    Arc::new(AppleMusicPlaylistAdapter::new(
                        client,
                        &sources.apple_music_base_url,
                        playlist_id,
                        token,
                    ))
                }
            };
            tracing::info!(source = %source, "Registered chart source");
            adapters.push(adapter);
        }

        let lookup: Option<Arc<dyn GenreLookup>> = if config.enrichment.lookup_enabled {
            let lookup_client = build_http_client(config.http.lookup_timeout())
                .map_err(|e| trf_common::Error::Internal(format!("HTTP client: {}", e)))?;
            Some(Arc::new(ItunesGenreLookup::new(
                lookup_client,
                &config.enrichment.itunes_base_url,
                config.enrichment.requests_per_minute,
            )))
        } else {
            tracing::info!("Genre lookup disabled, using heuristic mapping only");
            None
        };

        let enricher = Enricher::new(
            lookup,
            config.remix_mapper(),
            Duration::from_secs(config.cache.genre_ttl_secs),
            config.enrichment.workers,
        );

        Ok(Self::new(
            adapters,
            enricher,
            Duration::from_secs(config.cache.chart_ttl_secs),
            BreakerSettings {
                failure_threshold: config.breaker.failure_threshold,
                cooldown: Duration::from_secs(config.breaker.cooldown_secs),
            },
        ))
    }

    /// Registered sources in canonical order
    pub async fn sources(&self) -> Vec<SourceStatus> {
        let mut statuses = Vec::new();
        for source in Source::ALL {
            if let Some(breaker) = self.breakers.get(&source) {
                statuses.push(SourceStatus {
                    id: source,
                    name: source.display_name(),
                    breaker: breaker.state().await,
                });
            }
        }
        statuses
    }

    pub fn is_registered(&self, source: Source) -> bool {
        self.adapters.contains_key(&source)
    }

    /// Registered sources in canonical order, used when a request names none
    pub fn default_sources(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .filter(|source| self.is_registered(*source))
            .collect()
    }

    /// Remix category labels of the current mapping policy
    pub async fn categories(&self) -> Vec<String> {
        self.enricher.mapper().await.categories()
    }

    /// Fetch, enrich and merge the requested sources
    pub async fn refresh(&self, request: &RefreshRequest) -> ChartSnapshot {
        tracing::info!(
            sources = ?request.sources.iter().map(Source::id).collect::<Vec<_>>(),
            region = %request.query.region,
            limit = request.query.limit,
            force = request.force,
            "Refreshing charts"
        );

        let results = join_all(
            request
                .sources
                .iter()
                .map(|source| self.fetch_source(*source, &request.query, request.force)),
        )
        .await;

        let mut lists = Vec::with_capacity(results.len());
        let mut fetch_errors = Vec::new();
        let mut enrichment_errors = Vec::new();
        for result in results {
            lists.push(result.tracks);
            fetch_errors.extend(result.fetch_error);
            enrichment_errors.extend(result.enrichment_errors);
        }

        let tracks = aggregator::merge(lists);

        tracing::info!(
            tracks = tracks.len(),
            fetch_errors = fetch_errors.len(),
            enrichment_errors = enrichment_errors.len(),
            "Charts refreshed"
        );

        ChartSnapshot {
            tracks,
            fetch_errors,
            enrichment_errors,
            fetched_at: Utc::now(),
        }
    }

    /// Drop cached charts for `sources`
    ///
    /// With a query only that region and limit is dropped, otherwise every
    /// cached region and limit of those sources. Returns the number of entries removed.
    pub async fn invalidate(&self, sources: &[Source], query: Option<&ChartQuery>) -> usize {
        let removed = match query {
            Some(query) => {
                let mut removed = 0;
                for source in sources {
                    let key = (*source, query.region.clone(), query.limit);
                    if self.cache.invalidate(&key).await {
                        removed += 1;
                    }
                }
                removed
            }
            None => {
                self.cache
                    .invalidate_where(|(source, _, _)| sources.contains(source))
                    .await
            }
        };

        tracing::info!(removed, "Chart cache invalidated");
        removed
    }

    /// Switch mapping policy and re-derive tags of cached tracks
    pub async fn retag_all(&self, mapper: RemixMapper) {
        self.enricher.set_mapper(mapper.clone()).await;
        self.cache
            .update_all(|tracks| tracks.iter_mut().for_each(|t| t.retag(&mapper)))
            .await;
        tracing::info!("Remix mapping policy replaced, cached tags re-derived");
    }

    async fn fetch_source(&self, source: Source, query: &ChartQuery, force: bool) -> SourceResult {
        let key: ChartKey = (source, query.region.clone(), query.limit);

        if force {
            self.cache.invalidate(&key).await;
        } else if let Some(tracks) = self.cache.get(&key).await {
            tracing::debug!(source = %source, "Chart cache hit");
            return SourceResult {
                tracks,
                fetch_error: None,
                enrichment_errors: Vec::new(),
            };
        }

        let (Some(adapter), Some(breaker)) = (self.adapters.get(&source), self.breakers.get(&source))
        else {
            return SourceResult::failed(FetchError::new(source, FetchCause::NotConfigured));
        };

        if !breaker.allow_request().await {
            tracing::debug!(source = %source, "Circuit open, skipping fetch");
            return SourceResult::failed(FetchError::new(source, FetchCause::CircuitOpen));
        }

        let outcome = adapter.fetch(query).await;
        if let Some(error) = outcome.error {
            breaker.record_failure().await;
            return SourceResult::failed(error);
        }
        breaker.record_success().await;

        let (tracks, enrichment_errors) = self.enricher.enrich_all(outcome.tracks).await;
        self.cache.insert(key, tracks.clone()).await;

        SourceResult {
            tracks,
            fetch_error: None,
            enrichment_errors,
        }
    }
}
