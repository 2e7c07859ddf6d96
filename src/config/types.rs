//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Recommendation cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Performance tracker configuration
    #[serde(default)]
    pub tracker: TrackerConfig,
    /// Recommendation service configuration
    #[serde(default)]
    pub recommendations: RecommendationConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Recommendation cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether cached recommendations are served at all
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Root cache directory; entries live under `<dir>/recommendations`
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    /// Time-to-live of a cache entry in minutes
    #[serde(default = "default_cache_ttl_minutes")]
    pub ttl_minutes: u64,
}

impl CacheConfig {
    /// Directory holding one JSON file per (strategy, risk level) key
    pub fn recommendations_dir(&self) -> PathBuf {
        self.dir.join("recommendations")
    }

    /// TTL as a duration, `None` when `ttl_minutes` is out of range
    pub fn checked_ttl(&self) -> Option<chrono::Duration> {
        i64::try_from(self.ttl_minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)
    }

    /// TTL as a duration, saturating at the largest representable span
    pub fn ttl(&self) -> chrono::Duration {
        self.checked_ttl().unwrap_or(chrono::Duration::MAX)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            dir: default_cache_dir(),
            ttl_minutes: default_cache_ttl_minutes(),
        }
    }
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache")
}

fn default_cache_ttl_minutes() -> u64 {
    60
}

/// Performance tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Root data directory; the store lives under `<data_dir>/performance`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl TrackerConfig {
    /// Path of the single performance store document
    pub fn store_path(&self) -> PathBuf {
        self.data_dir
            .join("performance")
            .join("performance_data.json")
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

/// Recommendation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Strategies the service accepts
    #[serde(default = "default_strategies")]
    pub strategies: Vec<String>,
    /// Number of recommendations returned when the caller does not ask
    #[serde(default = "default_max_recommendations")]
    pub default_max: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            default_max: default_max_recommendations(),
        }
    }
}

fn default_strategies() -> Vec<String> {
    [
        "momentum",
        "mean-reversion",
        "hybrid",
        "arbitrage",
        "volatility",
        "sentiment",
        "combined",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_recommendations() -> usize {
    5
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
