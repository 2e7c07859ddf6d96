//! Synthetic trading history for demos and UI development

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

use super::record::RecommendationRecord;
use crate::common::types::{Action, Confidence, Recommendation, RecommendationStatus};

/// Strategies the simulator spreads records across
pub const SIMULATED_STRATEGIES: [&str; 7] = [
    "momentum",
    "mean-reversion",
    "hybrid",
    "arbitrage",
    "volatility",
    "sentiment",
    "combined",
];

const LOOKBACK_SECONDS: i64 = 30 * 24 * 60 * 60;
const MAX_HOLD_SECONDS: i64 = 24 * 60 * 60;

/// Generate `count` records created within the last 30 days
///
/// Roughly half are closed, each at either its target or its stop.
pub fn simulated_records<R: Rng>(
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<RecommendationRecord> {
    (0..count).map(|i| simulated_record(i, now, rng)).collect()
}

fn simulated_record<R: Rng>(
    index: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> RecommendationRecord {
    let strategy = SIMULATED_STRATEGIES
        .choose(rng)
        .copied()
        .unwrap_or("momentum");
    let action = if rng.gen_bool(0.5) { Action::Yes } else { Action::No };
    let confidence = *[Confidence::Low, Confidence::Medium, Confidence::High]
        .choose(rng)
        .unwrap_or(&Confidence::Medium);

    let entry: i64 = rng.gen_range(10..=90);
    let (target, stop) = match action {
        Action::Yes => (entry + rng.gen_range(5..=15), entry - rng.gen_range(5..=10)),
        Action::No => (entry - rng.gen_range(5..=15), entry + rng.gen_range(5..=10)),
    };

    let recommendation = Recommendation::new(
        format!("market_{}", rng.gen_range(1..=10)),
        strategy,
        action,
        Decimal::from(entry),
    )
    .with_targets(Decimal::from(target), Decimal::from(stop))
    .with_confidence(confidence);

    let created = now - Duration::seconds(rng.gen_range(0..=LOOKBACK_SECONDS));
    let mut record = RecommendationRecord::open(format!("sim_rec_{}", index), &recommendation, created);

    if rng.gen_bool(0.5) {
        let exit = if rng.gen_bool(0.5) { target } else { stop };
        let exit_price = Decimal::from(exit);
        let (result, profit_loss) = action.settle(record.entry_price, exit_price);
        let exited = created + Duration::seconds(rng.gen_range(1..=MAX_HOLD_SECONDS));

        record.status = RecommendationStatus::Closed;
        record.exit_price = Some(exit_price);
        record.exit_timestamp = Some(exited.min(now));
        record.result = Some(result);
        record.profit_loss = Some(profit_loss);
    }

    record
}
