//! Configuration for trf-ca
//!
//! Bootstrap settings come from a TOML file (see `trf_common::config` for how
//! the file is located). Every field has a built-in default, so an absent file
//! or an empty table is valid.
//!
//! ```toml
//! port = 5740
//!
//! [logging]
//! level = "info"
//!
//! [cache]
//! chart_ttl_secs = 3600
//!
//! [sources]
//! enabled = ["kworb", "deezer", "apple_rss"]
//! apple_music_playlist_id = "pl.xxxx"
//!
//! [[remix.rules]]
//! keyword = "Pop"
//! category = "House"
//! bpm_min = 120
//! bpm_max = 128
//! ```
//!
//! The Apple Music bearer token is a secret: it is read from
//! `TRF_APPLE_MUSIC_TOKEN` first, then from `apple_music_token` in the TOML.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use trf_common::config::{load_toml_config, resolve_secret, LoggingConfig};
use trf_common::{Error, Result};

use crate::adapters::apple_music::APPLE_MUSIC_BASE_URL;
use crate::adapters::apple_rss::APPLE_RSS_BASE_URL;
use crate::adapters::deezer::DEEZER_BASE_URL;
use crate::adapters::kworb::KWORB_BASE_URL;
use crate::adapters::tokchart::TOKCHART_BASE_URL;
use crate::models::chart::{DEFAULT_LIMIT, DEFAULT_REGION};
use crate::models::{Source, TagSuggestion};
use crate::services::enricher::DEFAULT_WORKERS;
use crate::services::itunes_client::{DEFAULT_REQUESTS_PER_MINUTE, ITUNES_BASE_URL};
use crate::services::remix_mapper::{RemixMapper, RemixRule};

/// Module name used for the per-user config file (`trf-ca.toml`)
pub const MODULE_NAME: &str = "trf-ca";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TRF_CONFIG";

/// Environment variable holding the Apple Music developer token
pub const APPLE_MUSIC_TOKEN_ENV_VAR: &str = "TRF_APPLE_MUSIC_TOKEN";

/// Largest per-source limit accepted
pub const MAX_LIMIT: usize = 200;

/// Bootstrap configuration for trf-ca
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaConfig {
    /// Listen address
    pub host: String,
    /// HTTP server port
    pub port: u16,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub cache: CacheConfig,
    pub breaker: BreakerConfig,
    pub enrichment: EnrichmentConfig,
    pub sources: SourcesConfig,
    pub remix: RemixConfig,
    /// Region used when a request names none
    pub default_region: String,
    /// Per-source limit used when a request names none
    pub default_limit: usize,
    /// Apple Music developer token (prefer the environment variable)
    pub apple_music_token: Option<String>,
}

impl Default for CaConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5740,
            logging: LoggingConfig::default(),
            http: HttpConfig::default(),
            cache: CacheConfig::default(),
            breaker: BreakerConfig::default(),
            enrichment: EnrichmentConfig::default(),
            sources: SourcesConfig::default(),
            remix: RemixConfig::default(),
            default_region: DEFAULT_REGION.to_string(),
            default_limit: DEFAULT_LIMIT,
            apple_music_token: None,
        }
    }
}

/// Outbound HTTP timeouts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub fetch_timeout_secs: u64,
    pub lookup_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            lookup_timeout_secs: 5,
        }
    }
}

impl HttpConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

/// Cache time-to-live settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub chart_ttl_secs: u64,
    pub genre_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            chart_ttl_secs: 3600,
            genre_ttl_secs: 3600,
        }
    }
}

/// Per-source circuit breaker settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub cooldown_secs: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_secs: 60,
        }
    }
}

/// Genre lookup settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub lookup_enabled: bool,
    pub workers: usize,
    pub requests_per_minute: u32,
    pub itunes_base_url: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            lookup_enabled: true,
            workers: DEFAULT_WORKERS,
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            itunes_base_url: ITUNES_BASE_URL.to_string(),
        }
    }
}

/// Source selection and endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Source ids to register
    pub enabled: Vec<String>,
    pub kworb_base_url: String,
    pub tokchart_base_url: String,
    pub deezer_base_url: String,
    pub apple_rss_base_url: String,
    pub apple_music_base_url: String,
    /// Catalog playlist to read; Apple Music stays unregistered without one
    pub apple_music_playlist_id: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled: Source::ALL.iter().map(|s| s.id().to_string()).collect(),
            kworb_base_url: KWORB_BASE_URL.to_string(),
            tokchart_base_url: TOKCHART_BASE_URL.to_string(),
            deezer_base_url: DEEZER_BASE_URL.to_string(),
            apple_rss_base_url: APPLE_RSS_BASE_URL.to_string(),
            apple_music_base_url: APPLE_MUSIC_BASE_URL.to_string(),
            apple_music_playlist_id: None,
        }
    }
}

impl SourcesConfig {
    /// Parsed enabled sources, in configured order
    pub fn enabled_sources(&self) -> Result<Vec<Source>> {
        let mut sources = Vec::new();
        for id in &self.enabled {
            let source = id
                .parse::<Source>()
                .map_err(|e| Error::Config(format!("sources.enabled: {}", e)))?;
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        Ok(sources)
    }
}

/// Remix mapping policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemixConfig {
    pub rules: Vec<RemixRule>,
    pub fallback: TagSuggestion,
}

impl Default for RemixConfig {
    fn default() -> Self {
        Self {
            rules: RemixMapper::default_rules(),
            fallback: RemixMapper::default_fallback(),
        }
    }
}

impl CaConfig {
    /// Load from an optional TOML path and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: CaConfig = load_toml_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 || self.default_limit > MAX_LIMIT {
            return Err(Error::Config(format!(
                "default_limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        if self.http.fetch_timeout_secs == 0 || self.http.lookup_timeout_secs == 0 {
            return Err(Error::Config("http timeouts must be at least 1 second".to_string()));
        }
        if let Some(rule) = self.remix.rules.iter().find(|r| r.bpm_min > r.bpm_max) {
            return Err(Error::Config(format!(
                "remix rule '{}' has bpm_min > bpm_max",
                rule.keyword
            )));
        }
        if self.remix.fallback.bpm_min > self.remix.fallback.bpm_max {
            return Err(Error::Config("remix fallback has bpm_min > bpm_max".to_string()));
        }
        self.sources.enabled_sources()?;
        Ok(())
    }

    pub fn remix_mapper(&self) -> RemixMapper {
        RemixMapper::new(self.remix.rules.clone(), self.remix.fallback.clone())
    }

    /// Apple Music token from environment, then TOML
    pub fn resolve_apple_music_token(&self) -> Option<String> {
        resolve_secret(
            "Apple Music token",
            APPLE_MUSIC_TOKEN_ENV_VAR,
            self.apple_music_token.as_deref(),
        )
    }
}
