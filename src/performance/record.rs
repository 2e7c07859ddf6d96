//! Tracked recommendation records and their state machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::errors::{DashboardError, Result};
use crate::common::types::{Action, Confidence, Recommendation, RecommendationStatus, TradeResult};

/// Strategy bucket used when a recommendation does not name one
pub const UNKNOWN_STRATEGY: &str = "unknown";

/// A recommendation tracked from creation to resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub id: String,
    pub market_id: String,
    pub strategy: String,
    pub action: Action,
    pub entry_price: Decimal,
    pub target_exit: Decimal,
    pub stop_loss: Decimal,
    pub confidence: Confidence,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    pub status: RecommendationStatus,
    #[serde(default)]
    pub exit_price: Option<Decimal>,
    #[serde(default)]
    pub exit_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub result: Option<TradeResult>,
    #[serde(default)]
    pub profit_loss: Option<Decimal>,
    #[serde(default)]
    pub notes: String,
}

impl RecommendationRecord {
    /// Create an open record from a generator payload
    pub fn open(id: String, recommendation: &Recommendation, now: DateTime<Utc>) -> Self {
        let strategy = match recommendation.strategy.trim() {
            "" => UNKNOWN_STRATEGY.to_string(),
            s => s.to_string(),
        };

        Self {
            id,
            market_id: recommendation.market_id.clone(),
            strategy,
            action: recommendation.action,
            entry_price: recommendation.entry_price,
            target_exit: recommendation.target_exit,
            stop_loss: recommendation.stop_loss,
            confidence: recommendation.confidence,
            timestamp: now,
            status: RecommendationStatus::Open,
            exit_price: None,
            exit_timestamp: None,
            result: None,
            profit_loss: None,
            notes: String::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == RecommendationStatus::Open
    }

    /// Apply a status update
    ///
    /// Returns `false` without touching the record when it is already
    /// closed or expired. Result and profit/loss are computed exactly once,
    /// on the transition that supplies an exit price.
    pub(crate) fn apply(&mut self, update: &StatusUpdate, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }

        self.status = update.status;

        if let Some(exit_price) = update.exit_price {
            let (result, profit_loss) = self.action.settle(self.entry_price, exit_price);
            self.exit_price = Some(exit_price);
            self.exit_timestamp = Some(now);
            self.result = Some(result);
            self.profit_loss = Some(profit_loss);
        }

        if let Some(notes) = update.notes.as_deref().filter(|n| !n.is_empty()) {
            self.notes = notes.to_string();
        }

        true
    }
}

/// A requested status change
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: RecommendationStatus,
    pub exit_price: Option<Decimal>,
    pub notes: Option<String>,
}

impl StatusUpdate {
    /// Validate the combination of status and exit price
    ///
    /// Closing requires an exit price; an exit price on a record that
    /// stays open would resolve it without leaving the open state.
    pub fn new(
        status: RecommendationStatus,
        exit_price: Option<Decimal>,
        notes: Option<String>,
    ) -> Result<Self> {
        match (status, exit_price) {
            (RecommendationStatus::Closed, None) => Err(DashboardError::Validation(
                "closing a recommendation requires an exit price".to_string(),
            )),
            (RecommendationStatus::Open, Some(_)) => Err(DashboardError::Validation(
                "an exit price can only be supplied when closing or expiring".to_string(),
            )),
            _ => Ok(Self {
                status,
                exit_price,
                notes,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn open_record(action: Action, entry: Decimal) -> RecommendationRecord {
        let rec = Recommendation::new("MKT-1", "momentum", action, entry);
        RecommendationRecord::open("rec_1".to_string(), &rec, Utc::now())
    }

    #[test]
    fn test_open_defaults_unknown_strategy() {
        let rec = Recommendation::new("MKT-1", "", Action::Yes, dec!(50));
        let record = RecommendationRecord::open("rec_1".to_string(), &rec, Utc::now());
        assert_eq!(record.strategy, UNKNOWN_STRATEGY);
        assert!(record.is_open());
        assert!(record.result.is_none());
    }

    #[test]
    fn test_close_computes_result_once() {
        let mut record = open_record(Action::Yes, dec!(50));
        let close = StatusUpdate::new(
            RecommendationStatus::Closed,
            Some(dec!(70)),
            Some("target hit".to_string()),
        )
        .unwrap();

        assert!(record.apply(&close, Utc::now()));
        assert_eq!(record.result, Some(TradeResult::Win));
        assert_eq!(record.profit_loss, Some(dec!(20)));
        assert_eq!(record.notes, "target hit");
        assert!(record.exit_timestamp.is_some());

        let reclose =
            StatusUpdate::new(RecommendationStatus::Closed, Some(dec!(10)), None).unwrap();
        assert!(!record.apply(&reclose, Utc::now()));
        assert_eq!(record.profit_loss, Some(dec!(20)));
        assert_eq!(record.exit_price, Some(dec!(70)));
    }

    #[test]
    fn test_expire_without_price() {
        let mut record = open_record(Action::No, dec!(50));
        let expire = StatusUpdate::new(RecommendationStatus::Expired, None, None).unwrap();

        assert!(record.apply(&expire, Utc::now()));
        assert_eq!(record.status, RecommendationStatus::Expired);
        assert!(record.result.is_none());
        assert!(record.profit_loss.is_none());
    }

    #[test]
    fn test_invalid_updates_rejected() {
        assert!(StatusUpdate::new(RecommendationStatus::Closed, None, None).is_err());
        assert!(StatusUpdate::new(RecommendationStatus::Open, Some(dec!(1)), None).is_err());
        assert!(StatusUpdate::new(RecommendationStatus::Open, None, Some("n".into())).is_ok());
    }

    #[test]
    fn test_empty_notes_keep_previous() {
        let mut record = open_record(Action::Yes, dec!(50));
        record.notes = "watch volume".to_string();
        let touch = StatusUpdate::new(RecommendationStatus::Open, None, Some(String::new())).unwrap();

        assert!(record.apply(&touch, Utc::now()));
        assert_eq!(record.notes, "watch volume");
    }
}
