//! Configuration loading and config file resolution
//!
//! Bootstrap configuration is read from a TOML file located by priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config directory (`~/.config/trf/<module>.toml` on Linux)
//! 4. Built-in defaults (no file)

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level or EnvFilter directive (e.g. "info", "trf_ca=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// EnvFilter directives for `targets`
    ///
    /// A bare level ("debug") is applied to each target; a value that already
    /// holds directives ("trf_ca=debug,tower_http=warn") is used unchanged.
    pub fn filter_directives(&self, targets: &[&str]) -> String {
        let level = self.level.trim();
        if level.contains('=') || level.contains(',') {
            return level.to_string();
        }

        targets
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// User-Agent sent by every outbound HTTP client
pub fn user_agent() -> String {
    format!("TRF/{} (+https://github.com/trf/trf)", env!("CARGO_PKG_VERSION"))
}

/// Resolve the TOML config path for a module
///
/// Returns `None` when neither the CLI nor the environment name a file and no
/// per-user file exists; the caller then runs on built-in defaults.
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    module_name: &str,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config directory
    let user_config = default_config_path(module_name)?;
    if user_config.exists() {
        Some(user_config)
    } else {
        None
    }
}

/// Default per-user config file location for a module
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("trf").join(format!("{}.toml", module_name)))
}

/// Load and parse a TOML config file
///
/// A missing path yields `T::default()`; an unreadable or malformed file is an error.
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        info!("No config file found, using built-in defaults");
        return Ok(T::default());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve a secret from environment then TOML
///
/// **Priority:** ENV → TOML. Secrets are never compiled in.
pub fn resolve_secret(name: &str, env_var_name: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_var_name).ok().filter(|k| is_valid_key(k));
    let toml_value = toml_value.filter(|k| is_valid_key(k));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in both environment ({}) and TOML. Using environment.",
            name, env_var_name
        );
    }

    if let Some(key) = env_value {
        info!("{} loaded from environment variable", name);
        return Some(key);
    }

    if let Some(key) = toml_value {
        info!("{} loaded from TOML config", name);
        return Some(key.to_string());
    }

    None
}
