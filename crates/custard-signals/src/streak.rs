use chrono::{Duration, NaiveDate};

use crate::history::FlavorHistory;
use crate::signal::{Evidence, Signal};
use crate::thresholds::SignalThresholds;

/// Flag flavors currently on a run of consecutive days.
///
/// A run is active when its last day is `today` or the day before. Dates after
/// `today` are ignored.
#[must_use]
pub fn detect_active_streaks(
    histories: &[FlavorHistory],
    today: NaiveDate,
    thresholds: &SignalThresholds,
) -> Vec<Signal> {
    histories
        .iter()
        .filter_map(|history| {
            let streak_days = active_run_length(&history.dates, today)?;
            (streak_days >= thresholds.min_streak_days).then(|| {
                Signal::new(
                    &history.display,
                    &history.flavor_key,
                    Evidence::ActiveStreak { streak_days },
                )
            })
        })
        .collect()
}

/// Length of the run of consecutive days ending at the latest date on or
/// before `today`, provided that date is `today` or yesterday.
fn active_run_length(dates: &[NaiveDate], today: NaiveDate) -> Option<u32> {
    let mut past: Vec<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();
    past.sort_unstable();
    past.dedup();

    let last = *past.last()?;
    if today - last > Duration::days(1) {
        return None;
    }

    let mut run = 1u32;
    let mut expected = last;
    for date in past.iter().rev().skip(1) {
        expected -= Duration::days(1);
        if *date != expected {
            break;
        }
        run += 1;
    }
    Some(run)
}
