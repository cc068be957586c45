use chrono::Datelike;

use crate::history::FlavorHistory;
use crate::signal::{Evidence, Signal};
use crate::stats::round_to;
use crate::thresholds::{SignalThresholds, SEASONAL_WINDOW_MONTHS};

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Flag flavors concentrated in one three-month stretch of the calendar.
///
/// Windows wrap across the year boundary (Nov-Jan is a valid window). When
/// two windows hold the same count the one starting earliest in the year wins.
#[must_use]
pub fn detect_seasonal(histories: &[FlavorHistory], thresholds: &SignalThresholds) -> Vec<Signal> {
    histories
        .iter()
        .filter_map(|history| evaluate(history, thresholds))
        .collect()
}

fn evaluate(history: &FlavorHistory, thresholds: &SignalThresholds) -> Option<Signal> {
    let total = history.appearances();
    if total < thresholds.min_seasonal_appearances || total == 0 {
        return None;
    }

    let mut by_month = [0usize; 12];
    for date in &history.dates {
        by_month[date.month0() as usize] += 1;
    }

    let (start, in_window) = (0..12)
        .map(|start| {
            let count: usize = (0..SEASONAL_WINDOW_MONTHS)
                .map(|offset| by_month[(start + offset) % 12])
                .sum();
            (start, count)
        })
        .fold((0usize, 0usize), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });

    #[allow(clippy::cast_precision_loss)]
    let concentration = in_window as f64 / total as f64;
    if concentration < thresholds.min_seasonal_concentration {
        return None;
    }

    // 1-based calendar months; `start + offset` is always below 24.
    #[allow(clippy::cast_possible_truncation)]
    let window_months: [u32; SEASONAL_WINDOW_MONTHS] =
        std::array::from_fn(|offset| ((start + offset) % 12 + 1) as u32);
    let window_label = format!(
        "{}-{}",
        MONTH_ABBR[start],
        MONTH_ABBR[(start + SEASONAL_WINDOW_MONTHS - 1) % 12]
    );

    Some(Signal::new(
        &history.display,
        &history.flavor_key,
        Evidence::Seasonal {
            concentration: round_to(concentration, 2),
            window_months,
            window_label,
        },
    ))
}
