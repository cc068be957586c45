//! Day-of-week cadence detection.

use chrono::{Datelike, NaiveDate};

use crate::history::FlavorHistory;
use crate::signal::{Evidence, Signal};
use crate::stats::{chi_squared_uniform, pct, round_to};
use crate::thresholds::SignalThresholds;

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Weekday histogram, Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekdayBaseline {
    pub counts: [u32; 7],
    pub total: u32,
}

impl WeekdayBaseline {
    #[must_use]
    pub fn from_dates<'a, I>(dates: I) -> Self
    where
        I: IntoIterator<Item = &'a NaiveDate>,
    {
        let mut baseline = Self::default();
        for date in dates {
            let idx = date.weekday().num_days_from_monday() as usize;
            baseline.counts[idx] += 1;
            baseline.total += 1;
        }
        baseline
    }

    /// Share of the total on weekday `idx` (0 = Monday), as a percentage.
    #[must_use]
    pub fn pct(&self, idx: usize) -> Option<f64> {
        pct(*self.counts.get(idx)?, self.total)
    }

    /// Busiest weekday and its count. The earliest weekday wins ties.
    #[must_use]
    pub fn peak(&self) -> Option<(usize, u32)> {
        if self.total == 0 {
            return None;
        }
        let mut best = (0usize, self.counts[0]);
        for (idx, &count) in self.counts.iter().enumerate().skip(1) {
            if count > best.1 {
                best = (idx, count);
            }
        }
        Some(best)
    }

    #[must_use]
    pub fn active_weekdays(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }
}

/// Flag flavors that land on one weekday far more often than chance, net of
/// the store's own weekday schedule.
///
/// `baseline` is the store-wide histogram over every day the store reported a
/// flavor. An empty baseline is treated as absent.
#[must_use]
pub fn detect_dow_patterns(
    histories: &[FlavorHistory],
    baseline: Option<&WeekdayBaseline>,
    thresholds: &SignalThresholds,
) -> Vec<Signal> {
    let baseline = baseline.filter(|b| b.total > 0);

    if let Some(b) = baseline {
        if let Some((idx, _)) = b.peak() {
            let baseline_peak = b.pct(idx).unwrap_or(0.0);
            if baseline_peak >= thresholds.max_baseline_peak_pct {
                tracing::debug!(
                    baseline_peak,
                    weekday = WEEKDAY_NAMES[idx],
                    "store schedule is day-biased; weekday signals suppressed"
                );
                return Vec::new();
            }
        }
    }

    histories
        .iter()
        .filter_map(|history| evaluate(history, baseline, thresholds))
        .collect()
}

fn evaluate(
    history: &FlavorHistory,
    baseline: Option<&WeekdayBaseline>,
    thresholds: &SignalThresholds,
) -> Option<Signal> {
    if history.appearances() < thresholds.min_dow_appearances {
        return None;
    }
    let distinct = {
        let mut dates = history.dates.clone();
        dates.dedup();
        dates.len()
    };
    if distinct < thresholds.min_dow_distinct_days {
        return None;
    }

    let hist = WeekdayBaseline::from_dates(&history.dates);
    let (peak_idx, _) = hist.peak()?;
    let peak_pct = hist.pct(peak_idx)?;
    if peak_pct < thresholds.min_dow_peak_pct || peak_pct > thresholds.max_dow_peak_pct {
        return None;
    }

    let chi_squared = chi_squared_uniform(&hist.counts);
    if chi_squared <= thresholds.chi_squared_critical {
        return None;
    }

    let lift_pct = match baseline {
        Some(b) => {
            let lift = peak_pct - b.pct(peak_idx).unwrap_or(0.0);
            if lift < thresholds.min_dow_peak_lift_pct {
                return None;
            }
            Some(lift)
        }
        None => {
            if peak_pct >= thresholds.fixed_schedule_peak_pct
                && hist.active_weekdays() <= thresholds.fixed_schedule_max_active_weekdays
            {
                return None;
            }
            None
        }
    };

    Some(Signal::new(
        &history.display,
        &history.flavor_key,
        Evidence::DowPattern {
            peak_name: WEEKDAY_NAMES[peak_idx].to_string(),
            peak_pct: round_to(peak_pct, 1),
            chi_squared: round_to(chi_squared, 2),
            lift_pct: lift_pct.map(|l| round_to(l, 1)),
        },
    ))
}
