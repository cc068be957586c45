use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use custard_core::{BaselineFlavor, NationalBaseline, Observation};

use super::*;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn count(store: &str, flavor: &str, n: u64) -> ScopeFlavorCount {
    ScopeFlavorCount {
        store_id: store.to_string(),
        flavor_normalized: custard_core::normalize_flavor_key(flavor),
        flavor_display: flavor.to_string(),
        count: n,
    }
}

fn stores(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| (*s).to_string()).collect()
}

/// `flavors` distinct flavors at `store` in each of the given months.
fn month_rows(store: &str, months: &[(i32, u32)], flavors: usize) -> Vec<StoreMonthFlavor> {
    months
        .iter()
        .flat_map(|&(year, month)| {
            (0..flavors).map(move |i| StoreMonthFlavor {
                store_id: store.to_string(),
                year,
                month,
                flavor_normalized: format!("flavor {i}"),
            })
        })
        .collect()
}

fn national(entries: &[(&str, u64, u64)]) -> NationalBaseline {
    NationalBaseline {
        span_start: d(2025, 1, 1),
        span_end: d(2025, 12, 31),
        flavors: entries
            .iter()
            .map(|(k, appearances, distinct_stores)| {
                (
                    (*k).to_string(),
                    BaselineFlavor {
                        appearances: *appearances,
                        distinct_stores: *distinct_stores,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>(),
    }
}

fn every(store: &str, flavor: &str, start: NaiveDate, step: i64, n: i64) -> Vec<Observation> {
    (0..n)
        .map(|i| Observation::new(store, start + Duration::days(step * i), flavor))
        .collect()
}

#[test]
fn exclusive_flavors_keep_majority_flavors_only() {
    let snapshot = ScopeSnapshot {
        label: "state:WI".into(),
        store_ids: stores(&["a", "b", "c", "d", "e"]),
        flavor_counts: vec![
            count("a", "Turtle", 4),
            count("b", "Turtle", 3),
            count("c", "Turtle", 2),
            count("d", "Turtle", 2),
            count("e", "Turtle", 1),
            count("a", "Caramel Cashew", 30),
        ],
        ..ScopeSnapshot::default()
    };
    let agg = compute_geographic_aggregate(&snapshot, None, None, &GeoThresholds::default());
    assert_eq!(agg.store_count, 5);
    assert_eq!(agg.exclusive_flavors.len(), 1);
    let turtle = &agg.exclusive_flavors[0];
    assert_eq!(turtle.flavor, "Turtle");
    assert_eq!(turtle.appearances, 12);
    assert!((turtle.pct_of_scope_stores - 100.0).abs() < f64::EPSILON);
    assert!(turtle.national_rank.is_none());
}

#[test]
fn exclusive_flavors_rank_by_appearances_then_name() {
    let snapshot = ScopeSnapshot {
        label: "metro:madison".into(),
        store_ids: stores(&["a", "b"]),
        flavor_counts: vec![
            count("a", "Butter Pecan", 5),
            count("b", "Andes Mint", 5),
            count("a", "Turtle", 9),
        ],
        ..ScopeSnapshot::default()
    };
    let agg = compute_geographic_aggregate(&snapshot, None, None, &GeoThresholds::default());
    let names: Vec<_> = agg.exclusive_flavors.iter().map(|f| f.flavor.as_str()).collect();
    assert_eq!(names, vec!["Turtle", "Andes Mint", "Butter Pecan"]);
}

#[test]
fn exclusive_flavors_carry_national_rank() {
    let baseline = national(&[("turtle", 500, 50), ("andes mint", 900, 90)]);
    let table = FlavorRankTable::from_baseline(&baseline);
    let snapshot = ScopeSnapshot {
        label: "store:a".into(),
        store_ids: stores(&["a"]),
        flavor_counts: vec![count("a", "Turtle", 3)],
        ..ScopeSnapshot::default()
    };
    let agg = compute_geographic_aggregate(
        &snapshot,
        Some(&baseline),
        Some(&table),
        &GeoThresholds::default(),
    );
    assert_eq!(agg.exclusive_flavors[0].national_rank, Some(2));
}

#[test]
fn stale_rank_table_is_ignored() {
    let old = national(&[("turtle", 500, 50), ("andes mint", 900, 90)]);
    let current = national(&[("turtle", 950, 95), ("andes mint", 900, 90)]);
    let table = FlavorRankTable::from_baseline(&old);
    let snapshot = ScopeSnapshot {
        label: "store:a".into(),
        store_ids: stores(&["a"]),
        flavor_counts: vec![count("a", "Turtle", 3)],
        ..ScopeSnapshot::default()
    };

    let agg = compute_geographic_aggregate(
        &snapshot,
        Some(&current),
        Some(&table),
        &GeoThresholds::default(),
    );
    assert_eq!(agg.exclusive_flavors[0].national_rank, None);

    let without_baseline =
        compute_geographic_aggregate(&snapshot, None, Some(&table), &GeoThresholds::default());
    assert_eq!(without_baseline.exclusive_flavors[0].national_rank, None);

    let rebuilt = FlavorRankTable::from_baseline(&current);
    let agg = compute_geographic_aggregate(
        &snapshot,
        Some(&current),
        Some(&rebuilt),
        &GeoThresholds::default(),
    );
    assert_eq!(agg.exclusive_flavors[0].national_rank, Some(1));
}

#[test]
fn rows_outside_scope_are_ignored() {
    let snapshot = ScopeSnapshot {
        label: "store:a".into(),
        store_ids: stores(&["a"]),
        flavor_counts: vec![count("a", "Turtle", 1), count("zz", "Mint", 50)],
        ..ScopeSnapshot::default()
    };
    let agg = compute_geographic_aggregate(&snapshot, None, None, &GeoThresholds::default());
    assert_eq!(agg.exclusive_flavors.len(), 1);
    assert_eq!(agg.exclusive_flavors[0].flavor_key, "turtle");
}

#[test]
fn cadence_variance_compares_against_national_gap() {
    // national turtle gap: 365 / (730 / 73) = 36.5 days
    // national mint gap: 365 / 365 = 1 day
    let baseline = national(&[("turtle", 730, 73), ("mint", 365, 1)]);
    let mut observations = every("a", "Turtle", d(2025, 1, 1), 20, 3);
    observations.extend(every("b", "Turtle", d(2025, 1, 1), 20, 3));
    observations.extend(every("a", "Mint", d(2025, 1, 2), 20, 6));
    observations.extend(every("b", "Caramel", d(2025, 1, 3), 20, 4));
    let snapshot = ScopeSnapshot {
        label: "state:WI".into(),
        store_ids: stores(&["a", "b"]),
        observations,
        ..ScopeSnapshot::default()
    };
    let agg = compute_geographic_aggregate(
        &snapshot,
        Some(&baseline),
        None,
        &GeoThresholds::default(),
    );
    // mint ratio 20 is out of bounds; caramel has too few appearances and no baseline
    assert_eq!(agg.cadence_variance.len(), 1);
    let turtle = &agg.cadence_variance[0];
    assert_eq!(turtle.flavor_key, "turtle");
    assert_eq!(turtle.scope_appearances, 6);
    assert!((turtle.scope_avg_gap_days - 20.0).abs() < 1e-9);
    assert!((turtle.national_avg_gap_days - 36.5).abs() < 1e-9);
    assert!((turtle.variance_ratio - 0.55).abs() < 1e-9);
    assert_eq!(turtle.direction, CadenceDirection::MoreFrequent);
}

#[test]
fn cadence_variance_is_empty_without_baseline() {
    let snapshot = ScopeSnapshot {
        label: "store:a".into(),
        store_ids: stores(&["a"]),
        observations: every("a", "Turtle", d(2025, 1, 1), 10, 8),
        ..ScopeSnapshot::default()
    };
    let agg = compute_geographic_aggregate(&snapshot, None, None, &GeoThresholds::default());
    assert!(agg.cadence_variance.is_empty());
}

#[test]
fn cadence_variance_sorts_by_distance_from_one() {
    let baseline = national(&[("turtle", 365, 10), ("mint", 365, 10)]);
    // national gap 10 days for both
    let mut observations = every("a", "Turtle", d(2025, 1, 1), 15, 6);
    observations.extend(every("a", "Mint", d(2025, 1, 2), 40, 6));
    let snapshot = ScopeSnapshot {
        label: "store:a".into(),
        store_ids: stores(&["a"]),
        observations,
        ..ScopeSnapshot::default()
    };
    let agg = compute_geographic_aggregate(
        &snapshot,
        Some(&baseline),
        None,
        &GeoThresholds::default(),
    );
    let keys: Vec<_> = agg.cadence_variance.iter().map(|c| c.flavor_key.as_str()).collect();
    assert_eq!(keys, vec!["mint", "turtle"]);
    assert_eq!(agg.cadence_variance[0].direction, CadenceDirection::LessFrequent);
}

#[test]
fn high_variety_store_is_an_outlier() {
    let months = [(2025, 1), (2025, 2)];
    let mut month_flavors = Vec::new();
    for store in ["a", "b", "c", "d"] {
        month_flavors.extend(month_rows(store, &months, 10));
    }
    month_flavors.extend(month_rows("e", &months, 20));
    let snapshot = ScopeSnapshot {
        label: "state:WI".into(),
        store_ids: stores(&["a", "b", "c", "d", "e"]),
        month_flavors,
        ..ScopeSnapshot::default()
    };
    let agg = compute_geographic_aggregate(&snapshot, None, None, &GeoThresholds::default());
    assert_eq!(agg.outlier_stores.len(), 1);
    let outlier = &agg.outlier_stores[0];
    assert_eq!(outlier.store_id, "e");
    assert!(outlier.z_score >= 1.5);
    assert_eq!(outlier.direction, OutlierDirection::MoreVariety);
    assert_eq!(outlier.months, 2);
    assert!((outlier.scope_mean - 12.0).abs() < 1e-9);
    assert!((outlier.scope_median - 10.0).abs() < 1e-9);
}

#[test]
fn fewer_than_three_qualifying_stores_yield_no_outliers() {
    let mut month_flavors = month_rows("a", &[(2025, 1), (2025, 2)], 2);
    month_flavors.extend(month_rows("b", &[(2025, 1), (2025, 2)], 30));
    // only one month of data, does not qualify
    month_flavors.extend(month_rows("c", &[(2025, 1)], 5));
    let snapshot = ScopeSnapshot {
        label: "state:WI".into(),
        store_ids: stores(&["a", "b", "c"]),
        month_flavors,
        ..ScopeSnapshot::default()
    };
    let agg = compute_geographic_aggregate(&snapshot, None, None, &GeoThresholds::default());
    assert!(agg.outlier_stores.is_empty());
}

#[test]
fn identical_stores_yield_no_outliers() {
    let mut month_flavors = Vec::new();
    for store in ["a", "b", "c", "d"] {
        month_flavors.extend(month_rows(store, &[(2025, 1), (2025, 2)], 8));
    }
    let snapshot = ScopeSnapshot {
        label: "state:WI".into(),
        store_ids: stores(&["a", "b", "c", "d"]),
        month_flavors,
        ..ScopeSnapshot::default()
    };
    let agg = compute_geographic_aggregate(&snapshot, None, None, &GeoThresholds::default());
    assert!(agg.outlier_stores.is_empty());
}

#[test]
fn empty_scope_is_empty_everywhere() {
    let agg = compute_geographic_aggregate(
        &ScopeSnapshot::default(),
        None,
        None,
        &GeoThresholds::default(),
    );
    assert_eq!(agg.store_count, 0);
    assert!(agg.exclusive_flavors.is_empty());
    assert!(agg.cadence_variance.is_empty());
    assert!(agg.outlier_stores.is_empty());
}
