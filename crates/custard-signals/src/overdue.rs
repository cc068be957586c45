use chrono::NaiveDate;

use crate::history::{gap_stats, FlavorHistory};
use crate::signal::{Evidence, Signal};
use crate::stats::round_to;
use crate::thresholds::SignalThresholds;

/// Flag flavors whose time since last appearance is well past their usual
/// return interval. Sorted by ratio descending, then flavor name.
#[must_use]
pub fn detect_overdue(
    histories: &[FlavorHistory],
    today: NaiveDate,
    thresholds: &SignalThresholds,
) -> Vec<Signal> {
    let mut found: Vec<(f64, Signal)> = histories
        .iter()
        .filter_map(|history| {
            if history.appearances() < thresholds.min_appearances {
                return None;
            }
            let stats = gap_stats(&history.dates)?;
            if stats.avg_gap_days <= 0.0 {
                return None;
            }
            let last = history.last_seen()?;
            let days_since = (today - last).num_days();
            if days_since <= 0 {
                return None;
            }
            #[allow(clippy::cast_precision_loss)]
            let ratio = days_since as f64 / stats.avg_gap_days;
            if ratio < thresholds.overdue_ratio {
                return None;
            }
            let signal = Signal::new(
                &history.display,
                &history.flavor_key,
                Evidence::Overdue {
                    days_since,
                    avg_gap_days: round_to(stats.avg_gap_days, 2),
                    ratio: round_to(ratio, 2),
                },
            );
            Some((ratio, signal))
        })
        .collect();

    found.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.flavor.cmp(&b.1.flavor)));
    found.into_iter().map(|(_, signal)| signal).collect()
}
