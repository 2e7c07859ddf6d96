//! Configuration loader

use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

use super::types::AppConfig;
use crate::common::errors::{DashboardError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP_, `__` between sections)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("recommendations.strategies"),
    );

    let config = builder
        .build()
        .map_err(|e| DashboardError::Configuration(e.to_string()))?;

    let config: AppConfig = config
        .try_deserialize()
        .map_err(|e| DashboardError::Configuration(e.to_string()))?;

    validate(config)
}

/// Load configuration from environment variables only
///
/// Understands the flat variable names used by the desktop launcher.
pub fn load_from_env() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::default();

    if let Ok(dir) = std::env::var("CACHE_DIR") {
        config.cache.dir = PathBuf::from(dir);
    }
    if let Ok(enabled) = std::env::var("CACHE_RECOMMENDATIONS") {
        config.cache.enabled = enabled.eq_ignore_ascii_case("true");
    }
    if let Ok(ttl) = std::env::var("CACHE_TTL_MINUTES") {
        config.cache.ttl_minutes = ttl.trim().parse().map_err(|e| {
            DashboardError::Configuration(format!("Invalid CACHE_TTL_MINUTES '{}': {}", ttl, e))
        })?;
    }
    if let Ok(dir) = std::env::var("DATA_DIR") {
        config.tracker.data_dir = PathBuf::from(dir);
    }
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        config.settings.log_level = level.to_lowercase();
    }

    validate(config)
}

/// Reject values that cannot be turned into runtime settings
fn validate(config: AppConfig) -> Result<AppConfig> {
    if config.cache.checked_ttl().is_none() {
        return Err(DashboardError::Configuration(format!(
            "cache ttl of {} minutes is out of range",
            config.cache.ttl_minutes
        )));
    }

    Ok(config)
}
