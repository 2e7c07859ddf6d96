//! Recommendation serving
//!
//! The service sits between request handlers and a [`RecommendationGenerator`]:
//!
//! ```text
//!   request ──▶ validate ──▶ cache hit? ──yes──▶ truncate ──▶ response
//!                               │ no / force_refresh
//!                               ▼
//!                           generator ──▶ tracker.record ──▶ cache.put ──▶ response
//! ```
//!
//! [`RecommendationGenerator`]: crate::common::traits::RecommendationGenerator

mod file_generator;
mod service;

pub use file_generator::JsonFileGenerator;
pub use service::{
    RecommendationRequest, RecommendationResponse, RecommendationService, StrategyInfo,
    MAX_RECOMMENDATIONS,
};
