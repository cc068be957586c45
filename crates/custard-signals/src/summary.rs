//! Store-level diversity and coverage summary.

use chrono::NaiveDate;
use custard_core::is_closed_marker;
use serde::Serialize;

use crate::history::build_flavor_histories;
use crate::overdue::detect_overdue;
use crate::ranking::StoreSnapshot;
use crate::stats::{median, quantile, round_to};
use crate::thresholds::SignalThresholds;

const TOP_FLAVORS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlavorCount {
    pub flavor: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSummary {
    pub store_id: String,
    /// Days with a reported flavor (closed days excluded).
    pub observations: usize,
    pub unique_flavors: usize,
    pub first_seen: Option<NaiveDate>,
    pub last_seen: Option<NaiveDate>,
    /// Shannon entropy of the flavor distribution, in bits.
    pub entropy: f64,
    /// Pielou evenness: entropy divided by its maximum for this many flavors.
    pub evenness: f64,
    /// Gaps between consecutive reporting days. Large values mean missing data.
    pub median_gap_days: Option<f64>,
    pub p95_gap_days: Option<f64>,
    pub top_flavors: Vec<FlavorCount>,
    pub overdue_count: usize,
}

#[must_use]
pub fn summarize_store(
    snapshot: &StoreSnapshot,
    today: NaiveDate,
    thresholds: &SignalThresholds,
) -> StoreSummary {
    let observations: Vec<_> = snapshot
        .observations
        .iter()
        .filter(|o| o.date <= today && !is_closed_marker(&o.flavor_display))
        .cloned()
        .collect();
    let histories = build_flavor_histories(&observations);

    let counts: Vec<usize> = histories.iter().map(|h| h.appearances()).collect();
    let total: usize = counts.iter().sum();
    let entropy = shannon_entropy(&counts);
    let evenness = if histories.len() > 1 {
        #[allow(clippy::cast_precision_loss)]
        let max = (histories.len() as f64).log2();
        entropy / max
    } else {
        0.0
    };

    let mut days: Vec<NaiveDate> = observations.iter().map(|o| o.date).collect();
    days.sort_unstable();
    days.dedup();
    #[allow(clippy::cast_precision_loss)]
    let gaps: Vec<f64> = days
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect();

    let mut top: Vec<FlavorCount> = histories
        .iter()
        .map(|h| FlavorCount {
            flavor: h.display.clone(),
            count: h.appearances(),
        })
        .collect();
    top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.flavor.cmp(&b.flavor)));
    top.truncate(TOP_FLAVORS);

    StoreSummary {
        store_id: snapshot.store_id.clone(),
        observations: total,
        unique_flavors: histories.len(),
        first_seen: days.first().copied(),
        last_seen: days.last().copied(),
        entropy: round_to(entropy, 3),
        evenness: round_to(evenness, 3),
        median_gap_days: median(&gaps),
        p95_gap_days: quantile(&gaps, 0.95).map(|v| round_to(v, 2)),
        top_flavors: top,
        overdue_count: detect_overdue(&histories, today, thresholds).len(),
    }
}

fn shannon_entropy(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let total = total as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            #[allow(clippy::cast_precision_loss)]
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}
