//! Historical performance tracking for recommendation strategies
//!
//! The tracker owns a single JSON store holding every tracked record,
//! bucketed by strategy, next to the per-strategy aggregates derived from
//! them. The whole document is kept in memory and rewritten after every
//! mutation. A mutex spans each read-modify-write cycle, so one tracker can
//! be shared between request handlers through an `Arc`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

use super::metrics::{PerformanceSummary, StrategyPerformance, TimeframePerformance};
use super::record::{RecommendationRecord, StatusUpdate};
use super::simulate::simulated_records;
use crate::common::errors::Result;
use crate::common::types::{Recommendation, RecommendationStatus, Timeframe};
use crate::config::types::TrackerConfig;
use crate::persistence::{read_json, write_json};

/// Default page size for [`RecommendationQuery`]
pub const DEFAULT_PAGE_LIMIT: usize = 50;

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// On-disk layout of the performance store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceData {
    /// Records per strategy, in creation order
    #[serde(default)]
    pub recommendations: BTreeMap<String, Vec<RecommendationRecord>>,
    /// Aggregate per strategy
    #[serde(default)]
    pub performance: BTreeMap<String, StrategyPerformance>,
}

impl PerformanceData {
    fn contains_id(&self, id: &str) -> bool {
        self.recommendations
            .values()
            .flatten()
            .any(|rec| rec.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut RecommendationRecord> {
        self.recommendations
            .values_mut()
            .flat_map(|records| records.iter_mut())
            .find(|rec| rec.id == id)
    }

    /// Rebuild one strategy's aggregate from its full record list
    fn refresh_aggregate(&mut self, strategy: &str, now: DateTime<Utc>) {
        let records = self
            .recommendations
            .get(strategy)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let perf = StrategyPerformance::compute(strategy, records, now);
        self.performance.insert(strategy.to_string(), perf);
    }
}

/// Filter and paging options for [`PerformanceTracker::recommendations`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationQuery {
    /// Exact strategy key
    pub strategy: Option<String>,
    pub status: Option<RecommendationStatus>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for RecommendationQuery {
    fn default() -> Self {
        Self {
            strategy: None,
            status: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl RecommendationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn status(mut self, status: RecommendationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// No page limit
    pub fn unbounded(mut self) -> Self {
        self.limit = usize::MAX;
        self
    }
}

/// Performance tracker backed by a single JSON store
#[derive(Debug)]
pub struct PerformanceTracker {
    path: PathBuf,
    data: Mutex<PerformanceData>,
}

impl PerformanceTracker {
    /// Open the store configured by `config`
    pub fn open(config: &TrackerConfig) -> Self {
        Self::with_path(config.store_path())
    }

    /// Open a store at an explicit path
    ///
    /// A missing store starts empty; an unreadable one is logged and
    /// replaced by an empty store on the next write.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = load_store(&path);
        info!(
            "Initialized performance tracker at {} ({} strategies)",
            path.display(),
            data.recommendations.len()
        );
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, PerformanceData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, data: &PerformanceData) {
        if let Err(e) = write_json(&self.path, data) {
            warn!("Failed to save performance data to {}: {}", self.path.display(), e);
        }
    }

    /// Start tracking a recommendation
    ///
    /// Returns the assigned identifier, or `None` for an empty payload.
    /// A caller-supplied id is kept unless it is already tracked.
    pub fn record(&self, recommendation: &Recommendation) -> Option<String> {
        self.record_at(recommendation, Utc::now())
    }

    pub(crate) fn record_at(
        &self,
        recommendation: &Recommendation,
        now: DateTime<Utc>,
    ) -> Option<String> {
        if recommendation.is_empty() {
            debug!("Ignoring empty recommendation");
            return None;
        }

        let mut data = self.lock();

        let id = match recommendation.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() && !data.contains_id(id) => id.to_string(),
            _ => loop {
                let candidate = generate_id(recommendation, now);
                if !data.contains_id(&candidate) {
                    break candidate;
                }
            },
        };

        let record = RecommendationRecord::open(id.clone(), recommendation, now);
        let strategy = record.strategy.clone();
        data.recommendations
            .entry(strategy.clone())
            .or_default()
            .push(record);
        data.refresh_aggregate(&strategy, now);
        self.flush(&data);

        info!("Recorded new recommendation: {} for strategy: {}", id, strategy);
        Some(id)
    }

    /// Move an open recommendation to a new status
    ///
    /// Returns `Ok(false)` when the id is unknown or the record is already
    /// closed or expired. Closing without an exit price, or supplying one
    /// while staying open, is a validation error.
    #[instrument(skip(self))]
    pub fn update_status(
        &self,
        id: &str,
        status: RecommendationStatus,
        exit_price: Option<Decimal>,
        notes: Option<String>,
    ) -> Result<bool> {
        let update = StatusUpdate::new(status, exit_price, notes)?;
        Ok(self.apply_update_at(id, &update, Utc::now()))
    }

    pub(crate) fn apply_update_at(
        &self,
        id: &str,
        update: &StatusUpdate,
        now: DateTime<Utc>,
    ) -> bool {
        let mut data = self.lock();

        let Some(record) = data.find_mut(id) else {
            warn!("Recommendation {} not found", id);
            return false;
        };

        if !record.apply(update, now) {
            warn!(
                "Recommendation {} is {} and cannot be updated",
                id, record.status
            );
            return false;
        }

        let strategy = record.strategy.clone();
        data.refresh_aggregate(&strategy, now);
        self.flush(&data);

        info!("Updated recommendation {} status to {}", id, update.status);
        true
    }

    /// Aggregate for one strategy, zero-valued if it has no records
    pub fn strategy_performance(&self, strategy: &str) -> StrategyPerformance {
        let data = self.lock();
        data.performance
            .get(strategy)
            .cloned()
            .unwrap_or_else(|| StrategyPerformance::empty(strategy, Utc::now()))
    }

    /// Aggregates for every strategy with records, ordered by name
    pub fn all_strategy_performance(&self) -> Vec<StrategyPerformance> {
        self.lock().performance.values().cloned().collect()
    }

    /// Tracked records, newest first, filtered and paged
    pub fn recommendations(&self, query: &RecommendationQuery) -> Vec<RecommendationRecord> {
        let data = self.lock();

        let mut records: Vec<&RecommendationRecord> = match &query.strategy {
            Some(strategy) => data
                .recommendations
                .get(strategy)
                .map(|records| records.iter().collect())
                .unwrap_or_default(),
            None => data.recommendations.values().flatten().collect(),
        };

        if let Some(status) = query.status {
            records.retain(|rec| rec.status == status);
        }

        // Buckets are in creation order; reversing first keeps later inserts
        // ahead on equal timestamps since the sort is stable.
        records.reverse();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        records
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect()
    }

    /// Look up a single record by id
    pub fn find(&self, id: &str) -> Option<RecommendationRecord> {
        self.lock()
            .recommendations
            .values()
            .flatten()
            .find(|rec| rec.id == id)
            .cloned()
    }

    /// Totals across strategies, summed from the stored aggregates
    pub fn performance_summary(&self) -> PerformanceSummary {
        let data = self.lock();
        PerformanceSummary::from_aggregates(data.performance.values(), Utc::now())
    }

    /// Fresh statistics over records created within `timeframe`
    pub fn performance_by_timeframe(
        &self,
        strategy: Option<&str>,
        timeframe: Timeframe,
    ) -> TimeframePerformance {
        self.performance_by_timeframe_at(strategy, timeframe, Utc::now())
    }

    pub(crate) fn performance_by_timeframe_at(
        &self,
        strategy: Option<&str>,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> TimeframePerformance {
        let data = self.lock();
        match strategy {
            Some(s) => TimeframePerformance::compute(
                timeframe,
                strategy,
                data.recommendations.get(s).into_iter().flatten(),
                now,
            ),
            None => TimeframePerformance::compute(
                timeframe,
                None,
                data.recommendations.values().flatten(),
                now,
            ),
        }
    }

    /// Replace all history with `count` simulated records
    pub fn simulate_history(&self, count: usize) {
        let now = Utc::now();
        let records = simulated_records(count, now, &mut rand::thread_rng());

        let mut data = self.lock();
        *data = PerformanceData::default();
        for record in records {
            data.recommendations
                .entry(record.strategy.clone())
                .or_default()
                .push(record);
        }

        let strategies: Vec<String> = data.recommendations.keys().cloned().collect();
        for strategy in &strategies {
            data.refresh_aggregate(strategy, now);
        }
        self.flush(&data);

        info!("Simulated {} historical recommendations", count);
    }
}

fn load_store(path: &Path) -> PerformanceData {
    match read_json(path) {
        Ok(Some(data)) => data,
        Ok(None) => PerformanceData::default(),
        Err(e) => {
            warn!("Failed to load performance data from {}: {}", path.display(), e);
            PerformanceData::default()
        }
    }
}

/// `rec_<millis>_<hash>`, the hash covering content and a process-wide sequence
fn generate_id(recommendation: &Recommendation, now: DateTime<Utc>) -> String {
    let sequence = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(recommendation).unwrap_or_default());
    hasher.update(sequence.to_le_bytes());
    hasher.update(now.timestamp_micros().to_le_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("rec_{}_{}", now.timestamp_millis(), &digest[..12])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{Action, TradeResult};
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn tracker_in(dir: &TempDir) -> PerformanceTracker {
        PerformanceTracker::with_path(dir.path().join("performance").join("performance_data.json"))
    }

    fn rec(strategy: &str, action: Action, entry: Decimal) -> Recommendation {
        Recommendation::new("MKT-1", strategy, action, entry)
    }

    #[test]
    fn test_record_assigns_unique_ids() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        let payload = rec("momentum", Action::Yes, dec!(50));
        let now = Utc::now();

        let a = tracker.record_at(&payload, now).unwrap();
        let b = tracker.record_at(&payload, now).unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("rec_"));
    }

    #[test]
    fn test_record_honors_supplied_id_once() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        let payload = rec("momentum", Action::Yes, dec!(50)).with_id("external-1");

        assert_eq!(tracker.record(&payload).as_deref(), Some("external-1"));
        let second = tracker.record(&payload).unwrap();
        assert_ne!(second, "external-1");
    }

    #[test]
    fn test_empty_recommendation_is_noop() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);

        let empty = Recommendation::new("", "", Action::Yes, dec!(0));
        assert!(tracker.record(&empty).is_none());
        assert!(tracker.all_strategy_performance().is_empty());
        assert!(!tracker.store_path().exists());
    }

    #[test]
    fn test_update_unknown_id() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        tracker.record(&rec("momentum", Action::Yes, dec!(50)));
        let before = tracker.all_strategy_performance();

        let updated = tracker
            .update_status("nonexistent-id", RecommendationStatus::Closed, Some(dec!(10)), None)
            .unwrap();
        assert!(!updated);
        assert_eq!(tracker.all_strategy_performance(), before);
    }

    #[test]
    fn test_close_yes_and_no_positions() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        let yes = tracker.record(&rec("momentum", Action::Yes, dec!(50))).unwrap();
        let no = tracker.record(&rec("momentum", Action::No, dec!(50))).unwrap();

        assert!(tracker
            .update_status(&yes, RecommendationStatus::Closed, Some(dec!(70)), None)
            .unwrap());
        assert!(tracker
            .update_status(&no, RecommendationStatus::Closed, Some(dec!(30)), None)
            .unwrap());

        for id in [&yes, &no] {
            let record = tracker.find(id).unwrap();
            assert_eq!(record.result, Some(TradeResult::Win));
            assert_eq!(record.profit_loss, Some(dec!(20)));
        }

        let perf = tracker.strategy_performance("momentum");
        assert_eq!(perf.win_count, 2);
        assert_eq!(perf.open_count, 0);
        assert_eq!(perf.total_profit_loss, dec!(40));
        assert_eq!(perf.accuracy, dec!(100));
    }

    #[test]
    fn test_terminal_records_are_immutable() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        let id = tracker.record(&rec("hybrid", Action::Yes, dec!(40))).unwrap();

        assert!(tracker
            .update_status(&id, RecommendationStatus::Closed, Some(dec!(30)), None)
            .unwrap());
        assert!(!tracker
            .update_status(&id, RecommendationStatus::Closed, Some(dec!(90)), Some("retry".into()))
            .unwrap());
        assert!(!tracker
            .update_status(&id, RecommendationStatus::Expired, None, None)
            .unwrap());

        let record = tracker.find(&id).unwrap();
        assert_eq!(record.status, RecommendationStatus::Closed);
        assert_eq!(record.result, Some(TradeResult::Loss));
        assert_eq!(record.profit_loss, Some(dec!(-10)));
        assert_eq!(record.notes, "");
    }

    #[test]
    fn test_close_without_exit_price_rejected() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        let id = tracker.record(&rec("hybrid", Action::Yes, dec!(40))).unwrap();

        let err = tracker
            .update_status(&id, RecommendationStatus::Closed, None, None)
            .unwrap_err();
        assert!(err.is_validation());
        assert!(tracker.find(&id).unwrap().is_open());
    }

    #[test]
    fn test_expired_records_are_counted() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        let a = tracker.record(&rec("momentum", Action::Yes, dec!(40))).unwrap();
        tracker.record(&rec("momentum", Action::Yes, dec!(40)));

        assert!(tracker
            .update_status(&a, RecommendationStatus::Expired, None, Some("market closed".into()))
            .unwrap());

        let perf = tracker.strategy_performance("momentum");
        assert_eq!(perf.expired_count, 1);
        assert_eq!(perf.open_count, 1);
        assert_eq!(perf.record_count(), 2);
        assert_eq!(tracker.find(&a).unwrap().notes, "market closed");
    }

    #[test]
    fn test_unknown_strategy_performance_is_zero() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        let perf = tracker.strategy_performance("never-used");
        assert_eq!(perf.strategy, "never-used");
        assert_eq!(perf.record_count(), 0);
    }

    #[test]
    fn test_pagination_is_stable_and_newest_first() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        let base = Utc::now() - Duration::hours(1);

        for i in 0..5 {
            let strategy = if i % 2 == 0 { "momentum" } else { "hybrid" };
            tracker.record_at(&rec(strategy, Action::Yes, dec!(50)), base + Duration::minutes(i));
        }

        let first = tracker.recommendations(&RecommendationQuery::new().page(2, 0));
        let second = tracker.recommendations(&RecommendationQuery::new().page(2, 2));
        let page: Vec<_> = first.iter().chain(second.iter()).collect();

        assert_eq!(page.len(), 4);
        for pair in page.windows(2) {
            assert!(pair[0].timestamp > pair[1].timestamp);
            assert_ne!(pair[0].id, pair[1].id);
        }
        assert_eq!(page[0].timestamp, base + Duration::minutes(4));
    }

    #[test]
    fn test_filter_by_strategy_and_status() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        let id = tracker.record(&rec("momentum", Action::Yes, dec!(50))).unwrap();
        tracker.record(&rec("momentum", Action::Yes, dec!(55)));
        tracker.record(&rec("hybrid", Action::No, dec!(60)));
        tracker
            .update_status(&id, RecommendationStatus::Closed, Some(dec!(60)), None)
            .unwrap();

        let momentum = tracker.recommendations(&RecommendationQuery::new().strategy("momentum"));
        assert_eq!(momentum.len(), 2);

        let open = tracker.recommendations(
            &RecommendationQuery::new()
                .strategy("momentum")
                .status(RecommendationStatus::Open),
        );
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].entry_price, dec!(55));

        let case_sensitive = tracker.recommendations(&RecommendationQuery::new().strategy("Momentum"));
        assert!(case_sensitive.is_empty());
    }

    #[test]
    fn test_aggregate_matches_record_count() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        let ids: Vec<_> = (0..6)
            .map(|i| tracker.record(&rec("momentum", Action::Yes, Decimal::from(40 + i))).unwrap())
            .collect();
        tracker.update_status(&ids[0], RecommendationStatus::Closed, Some(dec!(80)), None).unwrap();
        tracker.update_status(&ids[1], RecommendationStatus::Closed, Some(dec!(10)), None).unwrap();

        let perf = tracker.strategy_performance("momentum");
        let all = tracker.recommendations(&RecommendationQuery::new().strategy("momentum").unbounded());
        assert_eq!(perf.win_count + perf.loss_count + perf.open_count, all.len() as u64);
    }

    #[test]
    fn test_summary_equals_sum_of_strategies() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        for strategy in ["momentum", "hybrid", "mean-reversion"] {
            let id = tracker.record(&rec(strategy, Action::Yes, dec!(50))).unwrap();
            tracker.record(&rec(strategy, Action::No, dec!(50)));
            tracker
                .update_status(&id, RecommendationStatus::Closed, Some(dec!(65)), None)
                .unwrap();
        }

        let summary = tracker.performance_summary();
        let strategies = tracker.all_strategy_performance();
        assert_eq!(summary.total_wins, strategies.iter().map(|s| s.win_count).sum::<u64>());
        assert_eq!(summary.total_open, 3);
        assert_eq!(summary.total_recommendations, 6);
        assert_eq!(summary.total_profit_loss, dec!(45));
    }

    #[test]
    fn test_timeframe_uses_creation_time() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        let now = Utc::now();
        tracker.record_at(&rec("momentum", Action::Yes, dec!(50)), now - Duration::days(10));
        tracker.record_at(&rec("momentum", Action::Yes, dec!(50)), now - Duration::hours(3));
        tracker.record_at(&rec("hybrid", Action::Yes, dec!(50)), now - Duration::hours(1));

        let week = tracker.performance_by_timeframe_at(Some("momentum"), Timeframe::Week, now);
        assert_eq!(week.recommendation_count, 1);
        assert_eq!(week.strategy, "momentum");

        let day = tracker.performance_by_timeframe_at(None, Timeframe::Day, now);
        assert_eq!(day.recommendation_count, 2);
        assert_eq!(day.open_count, 2);

        let all = tracker.performance_by_timeframe_at(None, Timeframe::All, now);
        assert_eq!(all.recommendation_count, 3);
    }

    #[test]
    fn test_store_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let id = {
            let tracker = tracker_in(&dir);
            let id = tracker.record(&rec("momentum", Action::No, dec!(50))).unwrap();
            tracker
                .update_status(&id, RecommendationStatus::Closed, Some(dec!(45)), Some("done".into()))
                .unwrap();
            id
        };

        let reopened = tracker_in(&dir);
        let record = reopened.find(&id).unwrap();
        assert_eq!(record.profit_loss, Some(dec!(5)));
        assert_eq!(record.notes, "done");
        assert_eq!(reopened.strategy_performance("momentum").win_count, 1);
    }

    #[test]
    fn test_corrupt_store_resets_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("performance").join("performance_data.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[1, 2,").unwrap();

        let tracker = PerformanceTracker::with_path(&path);
        assert!(tracker.all_strategy_performance().is_empty());

        assert!(tracker.record(&rec("momentum", Action::Yes, dec!(50))).is_some());
        let reopened = PerformanceTracker::with_path(&path);
        assert_eq!(reopened.strategy_performance("momentum").open_count, 1);
    }

    #[test]
    fn test_simulate_history_rebuilds_aggregates() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(&dir);
        tracker.record(&rec("custom", Action::Yes, dec!(50)));

        tracker.simulate_history(40);

        assert_eq!(tracker.strategy_performance("custom").record_count(), 0);
        let summary = tracker.performance_summary();
        assert_eq!(summary.total_recommendations, 40);
        let records = tracker.recommendations(&RecommendationQuery::new().unbounded());
        assert_eq!(records.len(), 40);
    }
}
