//! Chart pipeline services
//!
//! Pure stages (`normalizer`, `aggregator`, `filter`, `links`, `remix_mapper`)
//! plus the stateful pieces that make up the running pipeline
//! (`enricher`, `ttl_cache`, `circuit_breaker`, `chart_service`).

pub mod aggregator;
pub mod chart_service;
pub mod circuit_breaker;
pub mod enricher;
pub mod filter;
pub mod itunes_client;
pub mod links;
pub mod normalizer;
pub mod remix_mapper;
pub mod ttl_cache;

pub use chart_service::{BreakerSettings, ChartService, RefreshRequest, SourceStatus};
pub use enricher::Enricher;
pub use filter::ViewOptions;
pub use remix_mapper::{RemixMapper, RemixRule};
