//! Recommendation service: validation, caching and tracking around a generator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::cache::RecommendationCache;
use crate::common::errors::{DashboardError, Result};
use crate::common::traits::SharedGenerator;
use crate::common::types::{Recommendation, RiskLevel};
use crate::config::types::RecommendationConfig;
use crate::performance::PerformanceTracker;

/// Largest list a caller may ask for
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Display name and description of every strategy the dashboard knows
const STRATEGY_CATALOG: [(&str, &str, &str); 7] = [
    (
        "momentum",
        "Momentum",
        "Identifies markets with strong trends and suggests continuing in that direction.",
    ),
    (
        "mean-reversion",
        "Mean Reversion",
        "Identifies markets with extreme prices that might revert to their average.",
    ),
    (
        "hybrid",
        "Hybrid",
        "Combines momentum and mean-reversion strategies for a balanced approach.",
    ),
    (
        "arbitrage",
        "Arbitrage",
        "Identifies arbitrage opportunities between related markets.",
    ),
    (
        "volatility",
        "Volatility-Based",
        "Identifies markets with unusual volatility and recommends trades based on expected price movement.",
    ),
    (
        "sentiment",
        "Sentiment-Driven",
        "Uses social feed data to identify markets with strong sentiment signals.",
    ),
    (
        "combined",
        "Combined Strategies",
        "Uses all available strategies to generate a diverse set of recommendations.",
    ),
];

/// Parameters of a recommendations request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub strategy: String,
    #[serde(default = "default_risk_level")]
    pub risk_level: String,
    /// Falls back to the configured default when absent
    #[serde(default)]
    pub max_recommendations: Option<usize>,
    #[serde(default)]
    pub force_refresh: bool,
}

fn default_risk_level() -> String {
    RiskLevel::default().to_string()
}

impl RecommendationRequest {
    pub fn new(strategy: impl Into<String>, risk_level: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            risk_level: risk_level.into(),
            max_recommendations: None,
            force_refresh: false,
        }
    }

    pub fn max(mut self, max_recommendations: usize) -> Self {
        self.max_recommendations = Some(max_recommendations);
        self
    }

    pub fn force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }
}

/// Recommendations served to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub strategy: String,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<Recommendation>,
    /// When the list was generated; on a cache hit, when it was cached
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    /// Generator that produced the list
    pub source: String,
    /// True when served from the cache
    pub cached: bool,
}

/// A strategy the service accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub risk_levels: Vec<RiskLevel>,
}

/// Serves recommendations from the cache, falling back to the generator
///
/// Freshly generated recommendations are recorded in the tracker before
/// they are cached, so the cached copies carry their tracking ids.
pub struct RecommendationService {
    generator: SharedGenerator,
    cache: RecommendationCache,
    tracker: Arc<PerformanceTracker>,
    config: RecommendationConfig,
}

impl RecommendationService {
    pub fn new(
        generator: SharedGenerator,
        cache: RecommendationCache,
        tracker: Arc<PerformanceTracker>,
        config: RecommendationConfig,
    ) -> Self {
        info!(
            "Initialized recommendation service with generator '{}'",
            generator.name()
        );
        Self {
            generator,
            cache,
            tracker,
            config,
        }
    }

    pub fn cache(&self) -> &RecommendationCache {
        &self.cache
    }

    pub fn tracker(&self) -> &Arc<PerformanceTracker> {
        &self.tracker
    }

    /// Serve recommendations for a strategy and risk level
    ///
    /// Only validation and generation failures are returned as errors.
    #[instrument(skip(self), fields(strategy = %request.strategy, risk = %request.risk_level))]
    pub async fn get_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse> {
        let strategy = self.validate_strategy(&request.strategy)?;
        let risk_level: RiskLevel = request.risk_level.parse()?;
        let max = request
            .max_recommendations
            .unwrap_or(self.config.default_max);
        if !(1..=MAX_RECOMMENDATIONS).contains(&max) {
            return Err(DashboardError::Validation(format!(
                "max_recommendations must be between 1 and {}, got {}",
                MAX_RECOMMENDATIONS, max
            )));
        }

        if !request.force_refresh {
            if let Some(entry) = self.cache.fresh_entry(&strategy, risk_level.as_str())? {
                info!("Using cached recommendations for {} strategy", strategy);
                let mut cached = entry.recommendations;
                cached.truncate(max);
                return Ok(RecommendationResponse {
                    strategy,
                    risk_level,
                    recommendations: cached,
                    timestamp: entry.timestamp,
                    source: entry
                        .source
                        .unwrap_or_else(|| self.generator.name().to_string()),
                    cached: true,
                });
            }
        }

        let mut fresh = self
            .generator
            .generate(&strategy, risk_level, max)
            .await
            .map_err(|e| {
                error!("Failed to generate recommendations: {}", e);
                match e {
                    DashboardError::GenerationFailed(_) => e,
                    other => DashboardError::GenerationFailed(other.to_string()),
                }
            })?;
        let generated_at = Utc::now();
        let source = self.generator.name().to_string();

        for rec in &mut fresh {
            if rec.strategy.trim().is_empty() {
                rec.strategy = strategy.clone();
            }
            if let Some(id) = self.tracker.record(rec) {
                rec.id = Some(id);
            }
        }

        self.cache.put_generated(
            &strategy,
            risk_level.as_str(),
            &fresh,
            &source,
            generated_at,
        )?;

        fresh.truncate(max);
        info!(
            "Generated {} recommendations for {} strategy",
            fresh.len(),
            strategy
        );
        Ok(RecommendationResponse {
            strategy,
            risk_level,
            recommendations: fresh,
            timestamp: generated_at,
            source,
            cached: false,
        })
    }

    /// Strategies accepted by [`get_recommendations`](Self::get_recommendations)
    pub fn available_strategies(&self) -> Vec<StrategyInfo> {
        self.config
            .strategies
            .iter()
            .map(|id| {
                let id = id.to_lowercase();
                let (name, description) = STRATEGY_CATALOG
                    .iter()
                    .find(|(known, _, _)| *known == id)
                    .map(|(_, name, description)| (name.to_string(), description.to_string()))
                    .unwrap_or_else(|| (display_name(&id), String::new()));
                StrategyInfo {
                    id,
                    name,
                    description,
                    risk_levels: RiskLevel::ALL.to_vec(),
                }
            })
            .collect()
    }

    fn validate_strategy(&self, strategy: &str) -> Result<String> {
        let normalized = strategy.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(DashboardError::Validation(
                "strategy must not be empty".to_string(),
            ));
        }

        if self
            .config
            .strategies
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&normalized))
        {
            Ok(normalized)
        } else {
            Err(DashboardError::InvalidStrategy {
                strategy: strategy.to_string(),
                allowed: self.config.strategies.clone(),
            })
        }
    }
}

/// `mean-reversion` -> `Mean Reversion`
fn display_name(id: &str) -> String {
    id.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
