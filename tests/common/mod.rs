//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use kalshi_dashboard::common::errors::{DashboardError, Result};
use kalshi_dashboard::config::types::{CacheConfig, RecommendationConfig, TrackerConfig};
use kalshi_dashboard::{
    Action, Confidence, PerformanceTracker, Recommendation, RecommendationCache,
    RecommendationGenerator, RecommendationService, RiskLevel,
};
use rust_decimal_macros::dec;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Create a sample YES recommendation for testing
pub fn sample_recommendation(market_id: &str, strategy: &str) -> Recommendation {
    Recommendation::new(market_id, strategy, Action::Yes, dec!(42))
        .with_targets(dec!(60), dec!(30))
        .with_confidence(Confidence::High)
}

/// Create `count` sample recommendations for one strategy
pub fn sample_batch(strategy: &str, count: usize) -> Vec<Recommendation> {
    (0..count)
        .map(|i| sample_recommendation(&format!("KXTEST-{}", i), strategy))
        .collect()
}

pub fn cache_config(dir: &Path) -> CacheConfig {
    CacheConfig {
        enabled: true,
        dir: dir.join("cache"),
        ttl_minutes: 60,
    }
}

pub fn tracker_config(dir: &Path) -> TrackerConfig {
    TrackerConfig {
        data_dir: dir.join("data"),
    }
}

/// Generator returning a fixed batch and counting how often it ran
pub struct StubGenerator {
    batch_size: usize,
    fail: bool,
    calls: AtomicUsize,
}

impl StubGenerator {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            batch_size: 0,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecommendationGenerator for StubGenerator {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(
        &self,
        strategy: &str,
        _risk_level: RiskLevel,
        _max_recommendations: usize,
    ) -> Result<Vec<Recommendation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DashboardError::Internal("market data unavailable".to_string()));
        }
        Ok(sample_batch(strategy, self.batch_size))
    }
}

/// Service wired to a stub generator under `dir`
pub fn service_with(
    dir: &Path,
    generator: Arc<StubGenerator>,
    cache_enabled: bool,
) -> RecommendationService {
    let mut cache = cache_config(dir);
    cache.enabled = cache_enabled;

    RecommendationService::new(
        generator,
        RecommendationCache::new(&cache),
        Arc::new(PerformanceTracker::open(&tracker_config(dir))),
        RecommendationConfig::default(),
    )
}
