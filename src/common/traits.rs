//! Trait definitions for recommendation sources

use async_trait::async_trait;
use std::sync::Arc;

use super::errors::Result;
use super::types::{Recommendation, RiskLevel};

/// Trait for recommendation generators (rule-based, model-backed, etc.)
///
/// Generators usually fetch market snapshots over the network, so they are
/// async. The service calls them only on a cache miss or a forced refresh.
#[async_trait]
pub trait RecommendationGenerator: Send + Sync {
    /// Name of the generator, used in logs
    fn name(&self) -> &str;

    /// Produce fresh recommendations
    ///
    /// # Arguments
    /// * `strategy` - Normalized (lowercase) strategy name
    /// * `risk_level` - Requested risk filter
    /// * `max_recommendations` - Upper bound the caller will truncate to
    async fn generate(
        &self,
        strategy: &str,
        risk_level: RiskLevel,
        max_recommendations: usize,
    ) -> Result<Vec<Recommendation>>;
}

/// Generator shared between the service and its callers
pub type SharedGenerator = Arc<dyn RecommendationGenerator>;
