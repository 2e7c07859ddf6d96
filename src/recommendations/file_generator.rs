//! Generator that serves recommendations from a JSON snapshot file

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::common::errors::{DashboardError, Result};
use crate::common::traits::RecommendationGenerator;
use crate::common::types::{Recommendation, RiskLevel};

/// Reads a JSON array of recommendations on every call
///
/// Entries whose strategy matches the request are preferred; if none
/// match, the whole snapshot is used and tagged with the requested strategy.
#[derive(Debug, Clone)]
pub struct JsonFileGenerator {
    path: PathBuf,
}

impl JsonFileGenerator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecommendationGenerator for JsonFileGenerator {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn generate(
        &self,
        strategy: &str,
        risk_level: RiskLevel,
        max_recommendations: usize,
    ) -> Result<Vec<Recommendation>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DashboardError::GenerationFailed(format!(
                "cannot read {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let snapshot: Vec<Recommendation> = serde_json::from_str(&raw)?;
        debug!(
            "Loaded {} recommendations from {} for {} ({} risk)",
            snapshot.len(),
            self.path.display(),
            strategy,
            risk_level
        );

        let (matching, rest): (Vec<_>, Vec<_>) = snapshot
            .into_iter()
            .partition(|rec| rec.strategy.eq_ignore_ascii_case(strategy));
        let selected = if matching.is_empty() { rest } else { matching };

        Ok(selected
            .into_iter()
            .take(max_recommendations)
            .map(|mut rec| {
                rec.strategy = strategy.to_string();
                rec
            })
            .collect())
    }
}
