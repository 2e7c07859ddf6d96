//! File-per-key recommendation cache with a TTL
//!
//! Each (strategy, risk level) pair maps to one JSON document under the
//! cache directory. Entries are never deleted; expiry is decided on read.
//! The cache is an optimization only, so read and write faults are logged
//! and turned into misses or ignored.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::common::errors::{DashboardError, Result};
use crate::common::types::Recommendation;
use crate::config::types::CacheConfig;
use crate::persistence::{read_json, write_json};

/// On-disk cache document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Write time, seconds since the epoch
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub strategy: String,
    pub risk_level: String,
    pub recommendations: Vec<Recommendation>,
    /// Generator that produced the list, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl CacheEntry {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }

    /// An entry is fresh while its age is strictly below the TTL
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

/// Normalized cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    strategy: String,
    risk_level: String,
}

impl CacheKey {
    /// Build a key, lowercasing both parts
    ///
    /// Both parts must be non-empty after trimming.
    pub fn new(strategy: &str, risk_level: &str) -> Result<Self> {
        let strategy = strategy.trim().to_lowercase();
        let risk_level = risk_level.trim().to_lowercase();

        if strategy.is_empty() {
            return Err(DashboardError::Validation(
                "strategy must not be empty".to_string(),
            ));
        }
        if risk_level.is_empty() {
            return Err(DashboardError::Validation(
                "risk level must not be empty".to_string(),
            ));
        }

        Ok(Self {
            strategy,
            risk_level,
        })
    }

    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn risk_level(&self) -> &str {
        &self.risk_level
    }

    /// Filesystem-safe token, e.g. `mean-reversion_high`
    ///
    /// `_` only ever separates the two parts; any other byte outside
    /// `[a-z0-9-]` is written as `%xx`, so distinct keys never share a file.
    pub fn file_token(&self) -> String {
        format!("{}_{}", encode(&self.strategy), encode(&self.risk_level))
    }
}

fn encode(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for byte in part.bytes() {
        if byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{:02x}", byte));
        }
    }
    out
}

/// Why a lookup did not produce recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// Caching is turned off
    Disabled,
    /// No entry was ever written for this key
    Absent,
    /// An entry exists but is older than the TTL
    Expired,
    /// The entry could not be read or parsed
    Unreadable,
}

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Vec<Recommendation>),
    Miss(MissReason),
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    /// Consume the lookup, returning the cached list on a hit
    pub fn into_hit(self) -> Option<Vec<Recommendation>> {
        match self {
            CacheLookup::Hit(recommendations) => Some(recommendations),
            CacheLookup::Miss(_) => None,
        }
    }
}

/// Recommendation cache rooted at a directory
#[derive(Debug, Clone)]
pub struct RecommendationCache {
    dir: PathBuf,
    ttl: Duration,
    enabled: bool,
}

impl RecommendationCache {
    /// Create a cache from configuration
    ///
    /// The directory is created lazily on first write.
    pub fn new(config: &CacheConfig) -> Self {
        info!(
            "Initialized recommendation cache at {} (ttl {} min, enabled: {})",
            config.recommendations_dir().display(),
            config.ttl_minutes,
            config.enabled
        );
        Self {
            dir: config.recommendations_dir(),
            ttl: config.ttl(),
            enabled: config.enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Path of the document backing `key`
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.file_token()))
    }

    /// Look up fresh recommendations for a (strategy, risk level) pair
    ///
    /// Only empty inputs are errors; every other failure is a miss.
    pub fn get(&self, strategy: &str, risk_level: &str) -> Result<CacheLookup> {
        let key = CacheKey::new(strategy, risk_level)?;
        Ok(self.lookup_at(&key, Utc::now()))
    }

    /// Store `recommendations`, replacing whatever was cached for the key
    ///
    /// Write failures are logged and swallowed. A disabled cache never
    /// touches the disk.
    pub fn put(
        &self,
        strategy: &str,
        risk_level: &str,
        recommendations: &[Recommendation],
    ) -> Result<()> {
        self.put_entry(strategy, risk_level, recommendations, None, Utc::now())
    }

    /// Store a freshly generated list along with its source and generation time
    pub fn put_generated(
        &self,
        strategy: &str,
        risk_level: &str,
        recommendations: &[Recommendation],
        source: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.put_entry(strategy, risk_level, recommendations, Some(source), generated_at)
    }

    fn put_entry(
        &self,
        strategy: &str,
        risk_level: &str,
        recommendations: &[Recommendation],
        source: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let key = CacheKey::new(strategy, risk_level)?;
        if !self.enabled {
            debug!("Cache disabled, not storing {}", key.file_token());
            return Ok(());
        }
        self.store_at(&key, recommendations, source, now);
        Ok(())
    }

    /// Fresh entry for a key, with its write time and source
    pub fn fresh_entry(&self, strategy: &str, risk_level: &str) -> Result<Option<CacheEntry>> {
        let key = CacheKey::new(strategy, risk_level)?;
        Ok(self.resolve_at(&key, Utc::now()).ok())
    }

    /// Load the raw entry for a key regardless of freshness
    pub fn peek(&self, strategy: &str, risk_level: &str) -> Result<Option<CacheEntry>> {
        let key = CacheKey::new(strategy, risk_level)?;
        match read_json(&self.entry_path(&key)) {
            Ok(entry) => Ok(entry),
            Err(e) => {
                warn!("Failed to read cache for {}: {}", key.file_token(), e);
                Ok(None)
            }
        }
    }

    pub(crate) fn lookup_at(&self, key: &CacheKey, now: DateTime<Utc>) -> CacheLookup {
        match self.resolve_at(key, now) {
            Ok(entry) => CacheLookup::Hit(entry.recommendations),
            Err(reason) => CacheLookup::Miss(reason),
        }
    }

    fn resolve_at(
        &self,
        key: &CacheKey,
        now: DateTime<Utc>,
    ) -> std::result::Result<CacheEntry, MissReason> {
        if !self.enabled {
            return Err(MissReason::Disabled);
        }

        let path = self.entry_path(key);
        let entry: CacheEntry = match read_json(&path) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("No cache entry for {}", key.file_token());
                return Err(MissReason::Absent);
            }
            Err(e) => {
                warn!("Failed to read cache {}: {}", path.display(), e);
                return Err(MissReason::Unreadable);
            }
        };

        if entry.strategy != key.strategy() || entry.risk_level != key.risk_level() {
            warn!(
                "Cache file {} holds {}/{}, not {}/{}",
                path.display(),
                entry.strategy,
                entry.risk_level,
                key.strategy(),
                key.risk_level()
            );
            return Err(MissReason::Absent);
        }

        if !entry.is_fresh(now, self.ttl) {
            info!(
                "Cache expired for {} strategy ({} risk), age {}s",
                key.strategy(),
                key.risk_level(),
                entry.age(now).num_seconds()
            );
            return Err(MissReason::Expired);
        }

        debug!(
            "Cache hit for {} with {} recommendations",
            key.file_token(),
            entry.recommendations.len()
        );
        Ok(entry)
    }

    pub(crate) fn store_at(
        &self,
        key: &CacheKey,
        recommendations: &[Recommendation],
        source: Option<&str>,
        now: DateTime<Utc>,
    ) {
        let entry = CacheEntry {
            timestamp: now,
            strategy: key.strategy().to_string(),
            risk_level: key.risk_level().to_string(),
            recommendations: recommendations.to_vec(),
            source: source.map(str::to_string),
        };

        let path = self.entry_path(key);
        match write_json(&path, &entry) {
            Ok(()) => info!("Cached recommendations for {} strategy", key.strategy()),
            Err(e) => warn!("Failed to cache recommendations to {}: {}", path.display(), e),
        }
    }
}
