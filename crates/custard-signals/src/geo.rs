//! Scope-level flavor intelligence: exclusive flavors, cadence against the
//! national baseline, and stores whose flavor diversity stands out.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use custard_core::{is_closed_marker, NationalBaseline, Observation};
use serde::Serialize;

use crate::history::scope_gap_stats;
use crate::rank_table::FlavorRankTable;
use crate::stats::{mean, median, population_stddev, round_to};
use crate::thresholds::GeoThresholds;

/// Appearances of one flavor at one store within the lookback window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFlavorCount {
    pub store_id: String,
    pub flavor_normalized: String,
    pub flavor_display: String,
    pub count: u64,
}

/// One flavor served at one store at least once in a calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreMonthFlavor {
    pub store_id: String,
    pub year: i32,
    pub month: u32,
    pub flavor_normalized: String,
}

/// Everything the aggregator needs for one scope.
#[derive(Debug, Clone, Default)]
pub struct ScopeSnapshot {
    /// Human-readable scope, e.g. `state:WI`.
    pub label: String,
    pub store_ids: Vec<String>,
    pub flavor_counts: Vec<ScopeFlavorCount>,
    pub observations: Vec<Observation>,
    pub month_flavors: Vec<StoreMonthFlavor>,
    /// Batched reads that failed while building this snapshot. Their rows are
    /// simply absent.
    pub failed_chunks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExclusiveFlavor {
    pub flavor: String,
    pub flavor_key: String,
    pub appearances: u64,
    pub store_count: usize,
    pub pct_of_scope_stores: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_rank: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceDirection {
    /// Shorter gaps than nationally.
    MoreFrequent,
    LessFrequent,
    Typical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CadenceVariance {
    pub flavor: String,
    pub flavor_key: String,
    pub scope_appearances: usize,
    pub scope_avg_gap_days: f64,
    pub national_avg_gap_days: f64,
    pub variance_ratio: f64,
    pub direction: CadenceDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierDirection {
    MoreVariety,
    LessVariety,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierStore {
    pub store_id: String,
    pub avg_unique_flavors_per_month: f64,
    pub months: usize,
    pub z_score: f64,
    pub direction: OutlierDirection,
    pub scope_mean: f64,
    /// Context only; the z-score uses the mean.
    pub scope_median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeographicAggregate {
    pub scope_label: String,
    pub store_count: usize,
    pub exclusive_flavors: Vec<ExclusiveFlavor>,
    pub cadence_variance: Vec<CadenceVariance>,
    pub outlier_stores: Vec<OutlierStore>,
}

/// Compute the geographic aggregate for one scope snapshot.
///
/// Rows belonging to stores outside `snapshot.store_ids` are ignored. Without
/// a national baseline the cadence-variance list is empty. Exclusive flavors
/// carry a `national_rank` only when `rank_table` was built from `baseline`;
/// a missing or stale table is ignored.
#[must_use]
pub fn compute_geographic_aggregate(
    snapshot: &ScopeSnapshot,
    baseline: Option<&NationalBaseline>,
    rank_table: Option<&FlavorRankTable>,
    thresholds: &GeoThresholds,
) -> GeographicAggregate {
    let scope: BTreeSet<&str> = snapshot.store_ids.iter().map(String::as_str).collect();

    let rank_table = rank_table.filter(|table| match baseline {
        Some(b) if table.is_current_for(b) => true,
        _ => {
            tracing::debug!(
                snapshot_id = %table.snapshot_id,
                "rank table does not match the national baseline; omitting ranks"
            );
            false
        }
    });
    let exclusive_flavors = exclusive_flavors(snapshot, &scope, rank_table, thresholds);
    let cadence_variance = baseline
        .map(|b| cadence_variance(snapshot, &scope, b, thresholds))
        .unwrap_or_default();
    let outlier_stores = outlier_stores(snapshot, &scope, thresholds);

    tracing::debug!(
        scope = %snapshot.label,
        stores = scope.len(),
        exclusive = exclusive_flavors.len(),
        cadence = cadence_variance.len(),
        outliers = outlier_stores.len(),
        failed_chunks = snapshot.failed_chunks,
        "computed geographic aggregate"
    );

    GeographicAggregate {
        scope_label: snapshot.label.clone(),
        store_count: scope.len(),
        exclusive_flavors,
        cadence_variance,
        outlier_stores,
    }
}

#[derive(Default)]
struct FlavorTally<'a> {
    appearances: u64,
    stores: BTreeSet<&'a str>,
    displays: BTreeMap<&'a str, u64>,
}

fn exclusive_flavors(
    snapshot: &ScopeSnapshot,
    scope: &BTreeSet<&str>,
    rank_table: Option<&FlavorRankTable>,
    thresholds: &GeoThresholds,
) -> Vec<ExclusiveFlavor> {
    if scope.is_empty() {
        return Vec::new();
    }

    let mut tallies: BTreeMap<&str, FlavorTally<'_>> = BTreeMap::new();
    for row in &snapshot.flavor_counts {
        if row.count == 0
            || row.flavor_normalized.is_empty()
            || !scope.contains(row.store_id.as_str())
            || is_closed_marker(&row.flavor_display)
        {
            continue;
        }
        let tally = tallies.entry(row.flavor_normalized.as_str()).or_default();
        tally.appearances += row.count;
        tally.stores.insert(row.store_id.as_str());
        *tally.displays.entry(row.flavor_display.as_str()).or_default() += row.count;
    }

    #[allow(clippy::cast_precision_loss)]
    let scope_size = scope.len() as f64;
    let mut out: Vec<ExclusiveFlavor> = tallies
        .into_iter()
        .filter_map(|(key, tally)| {
            #[allow(clippy::cast_precision_loss)]
            let pct = tally.stores.len() as f64 / scope_size * 100.0;
            if pct < thresholds.exclusive_min_store_pct {
                return None;
            }
            Some(ExclusiveFlavor {
                flavor: preferred_display(&tally.displays, key),
                flavor_key: key.to_string(),
                appearances: tally.appearances,
                store_count: tally.stores.len(),
                pct_of_scope_stores: round_to(pct, 1),
                national_rank: rank_table.and_then(|t| t.rank(key)),
            })
        })
        .collect();

    out.sort_by(|a, b| {
        b.appearances
            .cmp(&a.appearances)
            .then_with(|| a.flavor.cmp(&b.flavor))
            .then_with(|| a.flavor_key.cmp(&b.flavor_key))
    });
    out.truncate(thresholds.max_results);
    out
}

fn cadence_variance(
    snapshot: &ScopeSnapshot,
    scope: &BTreeSet<&str>,
    baseline: &NationalBaseline,
    thresholds: &GeoThresholds,
) -> Vec<CadenceVariance> {
    // flavor -> store -> dates
    let mut per_flavor: BTreeMap<&str, BTreeMap<String, Vec<NaiveDate>>> = BTreeMap::new();
    let mut displays: BTreeMap<&str, BTreeMap<&str, u64>> = BTreeMap::new();
    for obs in &snapshot.observations {
        if obs.flavor_normalized.is_empty()
            || !scope.contains(obs.store_id.as_str())
            || is_closed_marker(&obs.flavor_display)
        {
            continue;
        }
        per_flavor
            .entry(obs.flavor_normalized.as_str())
            .or_default()
            .entry(obs.store_id.clone())
            .or_default()
            .push(obs.date);
        *displays
            .entry(obs.flavor_normalized.as_str())
            .or_default()
            .entry(obs.flavor_display.as_str())
            .or_default() += 1;
    }

    let mut out: Vec<(f64, CadenceVariance)> = per_flavor
        .into_iter()
        .filter_map(|(key, stores)| {
            let stats = scope_gap_stats(&stores)?;
            if stats.appearances < thresholds.cadence_min_appearances {
                return None;
            }
            let national = baseline.national_avg_gap_days(key)?;
            let ratio = stats.avg_gap_days / national;
            if !ratio.is_finite()
                || ratio <= thresholds.cadence_min_ratio
                || ratio >= thresholds.cadence_max_ratio
            {
                return None;
            }
            let direction = if (ratio - 1.0).abs() < f64::EPSILON {
                CadenceDirection::Typical
            } else if ratio < 1.0 {
                CadenceDirection::MoreFrequent
            } else {
                CadenceDirection::LessFrequent
            };
            let flavor = displays
                .get(key)
                .map_or_else(|| key.to_string(), |d| preferred_display(d, key));
            Some((
                (ratio - 1.0).abs(),
                CadenceVariance {
                    flavor,
                    flavor_key: key.to_string(),
                    scope_appearances: stats.appearances,
                    scope_avg_gap_days: round_to(stats.avg_gap_days, 2),
                    national_avg_gap_days: round_to(national, 2),
                    variance_ratio: round_to(ratio, 2),
                    direction,
                },
            ))
        })
        .collect();

    out.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| a.1.flavor.cmp(&b.1.flavor))
            .then_with(|| a.1.flavor_key.cmp(&b.1.flavor_key))
    });
    out.truncate(thresholds.max_results);
    out.into_iter().map(|(_, v)| v).collect()
}

fn outlier_stores(
    snapshot: &ScopeSnapshot,
    scope: &BTreeSet<&str>,
    thresholds: &GeoThresholds,
) -> Vec<OutlierStore> {
    // store -> (year, month) -> distinct flavors
    let mut buckets: BTreeMap<&str, BTreeMap<(i32, u32), BTreeSet<&str>>> = BTreeMap::new();
    for row in &snapshot.month_flavors {
        if row.flavor_normalized.is_empty()
            || !scope.contains(row.store_id.as_str())
            || is_closed_marker(&row.flavor_normalized)
        {
            continue;
        }
        buckets
            .entry(row.store_id.as_str())
            .or_default()
            .entry((row.year, row.month))
            .or_default()
            .insert(row.flavor_normalized.as_str());
    }

    let qualifying: Vec<(&str, usize, f64)> = buckets
        .into_iter()
        .filter(|(_, months)| months.len() >= thresholds.outlier_min_months)
        .filter_map(|(store, months)| {
            #[allow(clippy::cast_precision_loss)]
            let sizes: Vec<f64> = months.values().map(|s| s.len() as f64).collect();
            mean(&sizes).map(|avg| (store, months.len(), avg))
        })
        .collect();

    if qualifying.len() < thresholds.outlier_min_stores {
        return Vec::new();
    }

    let averages: Vec<f64> = qualifying.iter().map(|(_, _, avg)| *avg).collect();
    let (Some(scope_mean), Some(stddev), Some(scope_median)) = (
        mean(&averages),
        population_stddev(&averages),
        median(&averages),
    ) else {
        return Vec::new();
    };
    if stddev <= f64::EPSILON {
        return Vec::new();
    }

    let mut out: Vec<(f64, OutlierStore)> = qualifying
        .into_iter()
        .filter_map(|(store, months, avg)| {
            let z = (avg - scope_mean) / stddev;
            (z.abs() >= thresholds.outlier_z_threshold).then(|| {
                (
                    z.abs(),
                    OutlierStore {
                        store_id: store.to_string(),
                        avg_unique_flavors_per_month: round_to(avg, 2),
                        months,
                        z_score: round_to(z, 2),
                        direction: if z > 0.0 {
                            OutlierDirection::MoreVariety
                        } else {
                            OutlierDirection::LessVariety
                        },
                        scope_mean: round_to(scope_mean, 2),
                        scope_median: round_to(scope_median, 2),
                    },
                )
            })
        })
        .collect();

    out.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| a.1.store_id.cmp(&b.1.store_id))
    });
    out.truncate(thresholds.max_results);
    out.into_iter().map(|(_, o)| o).collect()
}

/// Most common display name; ties go to the lexically smallest.
fn preferred_display(displays: &BTreeMap<&str, u64>, fallback: &str) -> String {
    displays
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map_or_else(|| fallback.to_string(), |(name, _)| (*name).to_string())
}

#[cfg(test)]
#[path = "geo_test.rs"]
mod tests;
