//! Data models for trf-ca

pub mod chart;
pub mod track;

pub use chart::{ChartQuery, ChartSnapshot, RawEntry};
pub use track::{LinkKind, Source, TagSuggestion, Track, UNKNOWN_GENRE};
