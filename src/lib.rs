//! KalshiDashboard Library
//!
//! Recommendation caching and historical performance tracking for a
//! prediction-market trading dashboard.

pub mod cache;
pub mod common;
pub mod config;
pub mod performance;
pub mod persistence;
pub mod recommendations;

// Re-export commonly used types
pub use cache::{CacheLookup, MissReason, RecommendationCache};
pub use common::errors::{DashboardError, Result};
pub use common::traits::{RecommendationGenerator, SharedGenerator};
pub use common::types::{
    Action, Confidence, Recommendation, RecommendationStatus, RiskLevel, Timeframe, TradeResult,
};
pub use config::types::AppConfig;
pub use performance::{
    PerformanceSummary, PerformanceTracker, RecommendationQuery, RecommendationRecord,
    StrategyPerformance, TimeframePerformance,
};
pub use recommendations::{
    JsonFileGenerator, RecommendationRequest, RecommendationResponse, RecommendationService,
};
