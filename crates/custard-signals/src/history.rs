//! Per-flavor date lists and gap statistics.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use custard_core::{is_closed_marker, Observation};

/// Every date a flavor appeared within one store, ascending and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavorHistory {
    pub flavor_key: String,
    /// The most frequently published display name for this key.
    pub display: String,
    pub dates: Vec<NaiveDate>,
}

impl FlavorHistory {
    #[must_use]
    pub fn appearances(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn last_seen(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapStats {
    pub appearances: usize,
    pub avg_gap_days: f64,
}

/// Group a store's observations into per-flavor histories, sorted by key.
///
/// Closed-day markers and titles that normalize to nothing are dropped.
#[must_use]
pub fn build_flavor_histories(observations: &[Observation]) -> Vec<FlavorHistory> {
    let mut dates: BTreeMap<&str, BTreeSet<NaiveDate>> = BTreeMap::new();
    let mut displays: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();

    for obs in observations {
        if obs.flavor_normalized.is_empty() || is_closed_marker(&obs.flavor_display) {
            continue;
        }
        dates
            .entry(obs.flavor_normalized.as_str())
            .or_default()
            .insert(obs.date);
        *displays
            .entry(obs.flavor_normalized.as_str())
            .or_default()
            .entry(obs.flavor_display.as_str())
            .or_default() += 1;
    }

    dates
        .into_iter()
        .map(|(key, set)| {
            let display = displays
                .get(key)
                .and_then(|counts| {
                    // max count; on ties the lexically smallest name wins
                    counts
                        .iter()
                        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
                        .map(|(name, _)| (*name).to_string())
                })
                .unwrap_or_else(|| key.to_string());
            FlavorHistory {
                flavor_key: key.to_string(),
                display,
                dates: set.into_iter().collect(),
            }
        })
        .collect()
}

/// Mean gap in days between consecutive distinct dates.
///
/// Duplicates are ignored. Returns `None` with fewer than two distinct dates.
#[must_use]
pub fn gap_stats(dates: &[NaiveDate]) -> Option<GapStats> {
    let unique: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    if unique.len() < 2 {
        return None;
    }
    let (first, last) = (unique.first()?, unique.last()?);
    let span = (*last - *first).num_days();
    #[allow(clippy::cast_precision_loss)]
    let avg_gap_days = span as f64 / (unique.len() - 1) as f64;
    Some(GapStats {
        appearances: unique.len(),
        avg_gap_days,
    })
}

/// Gap statistics for one flavor across several stores.
///
/// Each store's dates are deduplicated and measured on their own. The result
/// counts every `(store, date)` appearance and averages the per-store mean
/// gaps. Same-day appearances at different stores are never merged into a
/// single calendar date. Stores with a single appearance add to the count but
/// not to the gap average. Returns `None` when no store has two dates.
#[must_use]
pub fn scope_gap_stats(per_store: &BTreeMap<String, Vec<NaiveDate>>) -> Option<GapStats> {
    let mut appearances = 0usize;
    let mut store_gaps = Vec::new();

    for dates in per_store.values() {
        let unique: BTreeSet<NaiveDate> = dates.iter().copied().collect();
        appearances += unique.len();
        if let Some(stats) = gap_stats(dates) {
            store_gaps.push(stats.avg_gap_days);
        }
    }

    let avg_gap_days = crate::stats::mean(&store_gaps)?;
    Some(GapStats {
        appearances,
        avg_gap_days,
    })
}
