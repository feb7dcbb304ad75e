//! # TRF Common Library
//!
//! Shared code for TRF microservices:
//! - Error type
//! - Bootstrap configuration loading (TOML)
//! - Config file path resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
