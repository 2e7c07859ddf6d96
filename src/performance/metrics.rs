//! Win/loss statistics over sets of tracked records
//!
//! All functions here are pure: they take records and return figures.
//! The tracker decides which records to feed in and what to persist.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::record::RecommendationRecord;
use crate::common::types::{RecommendationStatus, Timeframe, TradeResult};

/// Persisted per-strategy aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyPerformance {
    pub strategy: String,
    pub win_count: u64,
    pub loss_count: u64,
    pub open_count: u64,
    /// Expired records that never received an exit price
    #[serde(default)]
    pub expired_count: u64,
    /// wins / (wins + losses) * 100
    pub win_rate: Decimal,
    /// Mean profit over winning records
    pub avg_profit: Decimal,
    /// Mean profit/loss over losing records
    pub avg_loss: Decimal,
    pub total_profit_loss: Decimal,
    /// closed / total * 100
    pub accuracy: Decimal,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub last_updated: DateTime<Utc>,
}

impl StrategyPerformance {
    /// Zero-valued aggregate for a strategy with no records
    pub fn empty(strategy: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::from_stats(strategy, &RecordStats::default(), now)
    }

    /// Recompute the aggregate from a strategy's full record list
    pub fn compute(strategy: impl Into<String>, records: &[RecommendationRecord], now: DateTime<Utc>) -> Self {
        Self::from_stats(strategy, &RecordStats::collect(records), now)
    }

    fn from_stats(strategy: impl Into<String>, stats: &RecordStats, now: DateTime<Utc>) -> Self {
        Self {
            strategy: strategy.into(),
            win_count: stats.wins,
            loss_count: stats.losses,
            open_count: stats.open,
            expired_count: stats.expired_unresolved,
            win_rate: stats.win_rate(),
            avg_profit: stats.avg_profit(),
            avg_loss: stats.avg_loss(),
            total_profit_loss: stats.total_profit_loss(),
            accuracy: percentage(stats.closed, stats.total),
            last_updated: now,
        }
    }

    /// Records accounted for by this aggregate
    pub fn record_count(&self) -> u64 {
        self.win_count + self.loss_count + self.open_count + self.expired_count
    }
}

/// Totals across all strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_recommendations: u64,
    pub total_wins: u64,
    pub total_losses: u64,
    pub total_open: u64,
    pub total_expired: u64,
    pub win_rate: Decimal,
    pub total_profit_loss: Decimal,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub last_updated: DateTime<Utc>,
}

impl PerformanceSummary {
    /// Sum stored aggregates without looking at raw records
    pub fn from_aggregates<'a>(
        aggregates: impl IntoIterator<Item = &'a StrategyPerformance>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut summary = Self {
            total_recommendations: 0,
            total_wins: 0,
            total_losses: 0,
            total_open: 0,
            total_expired: 0,
            win_rate: Decimal::ZERO,
            total_profit_loss: Decimal::ZERO,
            last_updated: now,
        };

        for perf in aggregates {
            summary.total_wins += perf.win_count;
            summary.total_losses += perf.loss_count;
            summary.total_open += perf.open_count;
            summary.total_expired += perf.expired_count;
            summary.total_profit_loss += perf.total_profit_loss;
        }

        summary.total_recommendations = summary.total_wins
            + summary.total_losses
            + summary.total_open
            + summary.total_expired;
        summary.win_rate = percentage(
            summary.total_wins,
            summary.total_wins + summary.total_losses,
        );
        summary
    }
}

/// On-demand statistics over a time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframePerformance {
    pub timeframe: Timeframe,
    /// Strategy filter, `"all"` when none
    pub strategy: String,
    pub win_count: u64,
    pub loss_count: u64,
    pub open_count: u64,
    pub expired_count: u64,
    pub win_rate: Decimal,
    pub avg_profit: Decimal,
    pub avg_loss: Decimal,
    pub total_profit_loss: Decimal,
    pub recommendation_count: u64,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub last_updated: DateTime<Utc>,
}

impl TimeframePerformance {
    pub fn compute<'a>(
        timeframe: Timeframe,
        strategy: Option<&str>,
        records: impl IntoIterator<Item = &'a RecommendationRecord>,
        now: DateTime<Utc>,
    ) -> Self {
        let cutoff = timeframe.window().map(|window| now - window);
        let stats = RecordStats::collect(
            records
                .into_iter()
                .filter(|rec| cutoff.map_or(true, |cutoff| rec.timestamp >= cutoff)),
        );

        Self {
            timeframe,
            strategy: strategy.unwrap_or("all").to_string(),
            win_count: stats.wins,
            loss_count: stats.losses,
            open_count: stats.open,
            expired_count: stats.expired_unresolved,
            win_rate: stats.win_rate(),
            avg_profit: stats.avg_profit(),
            avg_loss: stats.avg_loss(),
            total_profit_loss: stats.total_profit_loss(),
            recommendation_count: stats.total,
            last_updated: now,
        }
    }
}

/// Single-pass tally over records
#[derive(Debug, Default)]
struct RecordStats {
    total: u64,
    wins: u64,
    losses: u64,
    open: u64,
    closed: u64,
    expired_unresolved: u64,
    profit_sum: Decimal,
    profit_n: u64,
    loss_sum: Decimal,
    loss_n: u64,
}

impl RecordStats {
    fn collect<'a>(records: impl IntoIterator<Item = &'a RecommendationRecord>) -> Self {
        let mut stats = Self::default();

        for rec in records {
            stats.total += 1;

            match rec.status {
                RecommendationStatus::Open => stats.open += 1,
                RecommendationStatus::Closed => stats.closed += 1,
                RecommendationStatus::Expired if rec.result.is_none() => {
                    stats.expired_unresolved += 1
                }
                RecommendationStatus::Expired => {}
            }

            match rec.result {
                Some(TradeResult::Win) => {
                    stats.wins += 1;
                    if let Some(pnl) = rec.profit_loss {
                        stats.profit_sum += pnl;
                        stats.profit_n += 1;
                    }
                }
                Some(TradeResult::Loss) => {
                    stats.losses += 1;
                    if let Some(pnl) = rec.profit_loss {
                        stats.loss_sum += pnl;
                        stats.loss_n += 1;
                    }
                }
                None => {}
            }
        }

        stats
    }

    fn win_rate(&self) -> Decimal {
        percentage(self.wins, self.wins + self.losses)
    }

    fn avg_profit(&self) -> Decimal {
        mean(self.profit_sum, self.profit_n)
    }

    fn avg_loss(&self) -> Decimal {
        mean(self.loss_sum, self.loss_n)
    }

    fn total_profit_loss(&self) -> Decimal {
        self.profit_sum + self.loss_sum
    }
}

/// `part / whole * 100`, zero when `whole` is zero
pub(crate) fn percentage(part: u64, whole: u64) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole)).round_dp(4)
}

fn mean(sum: Decimal, n: u64) -> Decimal {
    if n == 0 {
        return Decimal::ZERO;
    }
    sum / Decimal::from(n)
}
