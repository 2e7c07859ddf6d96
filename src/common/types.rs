//! Domain types shared by the cache, the tracker and the service layer

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::errors::DashboardError;

/// Directional side of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    #[serde(alias = "Yes", alias = "yes")]
    Yes,
    #[serde(alias = "No", alias = "no")]
    No,
}

impl Action {
    /// Settle a position at `exit_price`
    ///
    /// YES profits when the price rises, NO when it falls. A breakeven exit
    /// (`exit_price == entry_price`) counts as a win on either side.
    pub fn settle(&self, entry_price: Decimal, exit_price: Decimal) -> (TradeResult, Decimal) {
        match self {
            Action::Yes => {
                let pnl = exit_price - entry_price;
                let result = if exit_price >= entry_price {
                    TradeResult::Win
                } else {
                    TradeResult::Loss
                };
                (result, pnl)
            }
            Action::No => {
                let pnl = entry_price - exit_price;
                let result = if exit_price <= entry_price {
                    TradeResult::Win
                } else {
                    TradeResult::Loss
                };
                (result, pnl)
            }
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Yes => write!(f, "YES"),
            Action::No => write!(f, "NO"),
        }
    }
}

/// Confidence label attached by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    #[serde(alias = "Low", alias = "low")]
    Low,
    #[default]
    #[serde(alias = "Medium", alias = "medium")]
    Medium,
    #[serde(alias = "High", alias = "high")]
    High,
}

/// Caller-chosen risk filter, part of the cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(DashboardError::InvalidRiskLevel(s.to_string())),
        }
    }
}

/// Lifecycle state of a tracked recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationStatus {
    Open,
    Closed,
    Expired,
}

impl RecommendationStatus {
    /// Closed and expired records accept no further updates
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecommendationStatus::Open)
    }
}

impl std::fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationStatus::Open => write!(f, "open"),
            RecommendationStatus::Closed => write!(f, "closed"),
            RecommendationStatus::Expired => write!(f, "expired"),
        }
    }
}

impl FromStr for RecommendationStatus {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(RecommendationStatus::Open),
            "closed" => Ok(RecommendationStatus::Closed),
            "expired" => Ok(RecommendationStatus::Expired),
            _ => Err(DashboardError::InvalidStatus(s.to_string())),
        }
    }
}

/// Outcome of a resolved position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeResult {
    Win,
    Loss,
}

/// Reporting window for on-demand performance queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Day,
    Week,
    Month,
    #[default]
    All,
}

impl Timeframe {
    /// Look-back window, `None` for all history
    pub fn window(&self) -> Option<Duration> {
        match self {
            Timeframe::Day => Some(Duration::days(1)),
            Timeframe::Week => Some(Duration::weeks(1)),
            Timeframe::Month => Some(Duration::days(30)),
            Timeframe::All => None,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::Day => write!(f, "day"),
            Timeframe::Week => write!(f, "week"),
            Timeframe::Month => write!(f, "month"),
            Timeframe::All => write!(f, "all"),
        }
    }
}

impl FromStr for Timeframe {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Timeframe::Day),
            "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            "all" => Ok(Timeframe::All),
            _ => Err(DashboardError::InvalidTimeframe(s.to_string())),
        }
    }
}

/// A proposed trade as emitted by a recommendation generator
///
/// The cache stores these verbatim; the tracker turns them into
/// [`RecommendationRecord`](crate::performance::RecommendationRecord)s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Caller-supplied identifier (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable market title
    #[serde(default)]
    pub market: String,
    /// Market identifier on the exchange
    #[serde(default)]
    pub market_id: String,
    /// Strategy that produced this recommendation
    #[serde(default)]
    pub strategy: String,
    /// Side to take
    pub action: Action,
    /// Entry price (the generator's probability estimate)
    #[serde(alias = "probability")]
    pub entry_price: Decimal,
    /// Suggested number of contracts
    #[serde(default)]
    pub contracts: u32,
    /// Estimated cost of the position
    #[serde(default)]
    pub cost: Decimal,
    /// Target exit price
    #[serde(default)]
    pub target_exit: Decimal,
    /// Stop-loss price
    #[serde(default)]
    pub stop_loss: Decimal,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub rationale: String,
}

impl Recommendation {
    pub fn new(
        market_id: impl Into<String>,
        strategy: impl Into<String>,
        action: Action,
        entry_price: Decimal,
    ) -> Self {
        Self {
            id: None,
            market: String::new(),
            market_id: market_id.into(),
            strategy: strategy.into(),
            action,
            entry_price,
            contracts: 0,
            cost: Decimal::ZERO,
            target_exit: Decimal::ZERO,
            stop_loss: Decimal::ZERO,
            confidence: Confidence::default(),
            rationale: String::new(),
        }
    }

    pub fn with_targets(mut self, target_exit: Decimal, stop_loss: Decimal) -> Self {
        self.target_exit = target_exit;
        self.stop_loss = stop_loss;
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// True when the payload identifies neither a market nor a strategy
    pub fn is_empty(&self) -> bool {
        self.market_id.trim().is_empty() && self.strategy.trim().is_empty()
    }
}
