//! Offline tests for custard-db pool configuration and row conversions.
//! These tests do not require a live database connection.

use chrono::NaiveDate;
use custard_core::{AppConfig, Environment, Observation, StoreMeta};
use custard_db::{
    FlavorCountRow, MonthFlavorRow, ObservationRow, PoolConfig, ReadWindow, StoreRow,
};
use custard_signals::{
    compute_geographic_aggregate, compute_store_signals, GeoThresholds, ScopeFlavorCount,
    ScopeSnapshot, SignalThresholds, StoreMonthFlavor, StoreSnapshot,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: Some("postgres://example".to_string()),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        query_chunk_size: 90,
        geo_lookback_days: 365,
        signal_limit: 10,
        cache_max_age_secs: 3600,
        thresholds_path: None,
        national_baseline_path: None,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn observation_row_converts_to_domain_observation() {
    let row = ObservationRow {
        store_id: "mt-horeb".to_string(),
        flavor_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        flavor_display: "Turtle".to_string(),
        flavor_normalized: "turtle".to_string(),
    };
    let obs = Observation::from(row);
    assert_eq!(obs.store_id, "mt-horeb");
    assert_eq!(obs.flavor_normalized, "turtle");
}

#[test]
fn flavor_count_row_clamps_negative_counts() {
    let row = FlavorCountRow {
        store_id: "a".to_string(),
        flavor_normalized: "turtle".to_string(),
        flavor_display: "Turtle".to_string(),
        appearances: -1,
    };
    assert_eq!(ScopeFlavorCount::from(row).count, 0);
}

#[test]
fn month_flavor_row_converts_month() {
    let row = MonthFlavorRow {
        store_id: "a".to_string(),
        year: 2025,
        month: 11,
        flavor_normalized: "turtle".to_string(),
    };
    let converted = StoreMonthFlavor::from(row);
    assert_eq!(converted.year, 2025);
    assert_eq!(converted.month, 11);
}

#[test]
fn store_row_upper_cases_state() {
    let row = StoreRow {
        store_id: "mt-horeb".to_string(),
        name: Some("Mt. Horeb".to_string()),
        city: Some("Mount Horeb".to_string()),
        state: Some("wi".to_string()),
        metro: Some("madison".to_string()),
    };
    let meta = StoreMeta::from(row);
    assert_eq!(meta.state.as_deref(), Some("WI"));
}

#[test]
fn read_window_ends_on_the_reference_day() {
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let window = ReadWindow::ending_on(today, 30);

    assert_eq!(window.since, NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
    assert_eq!(window.until, today);
    assert!(window.contains(today));
    assert!(window.contains(window.since));
    assert!(!window.contains(today.succ_opt().unwrap()));
    assert!(!window.contains(window.since.pred_opt().unwrap()));
}

#[test]
fn scope_and_store_paths_agree_on_rows_after_today() {
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let window = ReadWindow::ending_on(today, 365);
    let upcoming: Vec<ObservationRow> = (1..=6)
        .map(|offset| ObservationRow {
            store_id: if offset % 2 == 0 { "a" } else { "b" }.to_string(),
            flavor_date: today + chrono::Duration::days(offset),
            flavor_display: "Turtle".to_string(),
            flavor_normalized: "turtle".to_string(),
        })
        .collect();

    let store = StoreSnapshot {
        store_id: "a".to_string(),
        observations: upcoming.iter().cloned().map(Observation::from).collect(),
        ..StoreSnapshot::default()
    };
    let store_signals = compute_store_signals(&store, today, &SignalThresholds::default(), 10);
    assert!(store_signals.is_empty());

    let in_window: Vec<Observation> = upcoming
        .into_iter()
        .filter(|row| window.contains(row.flavor_date))
        .map(Observation::from)
        .collect();
    assert!(in_window.is_empty());

    let scope = ScopeSnapshot {
        label: "test".to_string(),
        store_ids: vec!["a".to_string(), "b".to_string()],
        observations: in_window,
        ..ScopeSnapshot::default()
    };
    let aggregate = compute_geographic_aggregate(&scope, None, None, &GeoThresholds::default());
    assert!(aggregate.exclusive_flavors.is_empty());
}

#[test]
fn rows_rekey_stored_flavor_keys_that_kept_punctuation() {
    let row = ObservationRow {
        store_id: "mt-horeb".to_string(),
        flavor_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        flavor_display: "Cookies & Cream".to_string(),
        flavor_normalized: "cookies & cream".to_string(),
    };
    assert_eq!(Observation::from(row).flavor_normalized, "cookies cream");

    let count: ScopeFlavorCount = FlavorCountRow {
        store_id: "mt-horeb".to_string(),
        flavor_normalized: "cookies & cream".to_string(),
        flavor_display: "Cookies & Cream".to_string(),
        appearances: 4,
    }
    .into();
    assert_eq!(count.flavor_normalized, "cookies cream");

    let month: StoreMonthFlavor = MonthFlavorRow {
        store_id: "mt-horeb".to_string(),
        year: 2026,
        month: 3,
        flavor_normalized: "cookies & cream".to_string(),
    }
    .into();
    assert_eq!(month.flavor_normalized, "cookies cream");
}
