//! Per-store signal computation: run every detector, then score and rank.

use chrono::NaiveDate;
use custard_core::{is_closed_marker, Observation};

use crate::cadence::{detect_dow_patterns, WeekdayBaseline};
use crate::history::build_flavor_histories;
use crate::overdue::detect_overdue;
use crate::rare::detect_rare_find;
use crate::seasonal::detect_seasonal;
use crate::signal::Signal;
use crate::streak::detect_active_streaks;
use crate::thresholds::SignalThresholds;

/// Everything the detectors need for one store, fetched once per request.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub store_id: String,
    pub observations: Vec<Observation>,
    /// Today's flavor if known independently of `observations`.
    pub todays_flavor: Option<String>,
    /// Distinct stores serving today's flavor, when known.
    pub todays_store_count: Option<u32>,
}

/// Run all five detectors over a store snapshot and return the top `limit`
/// signals.
#[must_use]
pub fn compute_store_signals(
    snapshot: &StoreSnapshot,
    today: NaiveDate,
    thresholds: &SignalThresholds,
    limit: usize,
) -> Vec<Signal> {
    let observations: Vec<Observation> = snapshot
        .observations
        .iter()
        .filter(|o| o.date <= today && !is_closed_marker(&o.flavor_display))
        .cloned()
        .collect();

    let histories = build_flavor_histories(&observations);

    let mut store_days: Vec<NaiveDate> = observations.iter().map(|o| o.date).collect();
    store_days.sort_unstable();
    store_days.dedup();
    let baseline = WeekdayBaseline::from_dates(&store_days);

    let todays_flavor = snapshot.todays_flavor.clone().or_else(|| {
        observations
            .iter()
            .find(|o| o.date == today)
            .map(|o| o.flavor_display.clone())
    });

    let mut signals = Vec::new();
    signals.extend(detect_overdue(&histories, today, thresholds));
    signals.extend(detect_dow_patterns(&histories, Some(&baseline), thresholds));
    signals.extend(detect_seasonal(&histories, thresholds));
    signals.extend(detect_active_streaks(&histories, today, thresholds));
    signals.extend(detect_rare_find(
        todays_flavor.as_deref(),
        snapshot.todays_store_count,
        thresholds,
    ));

    tracing::debug!(
        store_id = %snapshot.store_id,
        flavors = histories.len(),
        candidates = signals.len(),
        "computed store signals"
    );

    rank_signals(signals, limit)
}

/// Sort by score descending, then flavor name, then signal type, and keep the
/// first `limit`.
#[must_use]
pub fn rank_signals(mut signals: Vec<Signal>, limit: usize) -> Vec<Signal> {
    signals.sort_by(|a, b| {
        b.score()
            .total_cmp(&a.score())
            .then_with(|| a.flavor.cmp(&b.flavor))
            .then_with(|| a.kind().cmp(&b.kind()))
    });
    signals.truncate(limit);
    signals
}
