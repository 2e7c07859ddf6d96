//! Performance tracking module
//!
//! # Components
//!
//! - [`PerformanceTracker`]: records recommendations, applies status updates
//!   and keeps per-strategy aggregates in a JSON store
//! - [`RecommendationRecord`]: one tracked position and its state machine
//! - [`StrategyPerformance`], [`PerformanceSummary`], [`TimeframePerformance`]:
//!   derived statistics
//!
//! # Record lifecycle
//!
//! ```text
//!            exit price            ┌──────────┐
//!   ┌──────┐ ────────────────────▶ │  closed  │  result + P/L computed once
//!   │ open │                       └──────────┘
//!   └──────┘ ────────────────────▶ ┌──────────┐
//!            exit price optional   │ expired  │
//!                                  └──────────┘
//! ```

mod metrics;
mod record;
mod simulate;
mod tracker;

pub use metrics::{PerformanceSummary, StrategyPerformance, TimeframePerformance};
pub use record::{RecommendationRecord, StatusUpdate, UNKNOWN_STRATEGY};
pub use simulate::{simulated_records, SIMULATED_STRATEGIES};
pub use tracker::{PerformanceData, PerformanceTracker, RecommendationQuery, DEFAULT_PAGE_LIMIT};
