//! Flavor pattern detection and geographic analytics.
//!
//! Every entry point here is a pure function over an in-memory snapshot of
//! observations. Callers fetch the snapshot once per request (see
//! `custard-db`) and hand it in; nothing in this crate performs I/O apart from
//! [`load_thresholds`].
//!
//! Per-store signals come from five detectors (overdue, weekday cadence,
//! seasonal, active streak, rare find) merged and ranked by
//! [`compute_store_signals`]. Scope-level intelligence comes from
//! [`compute_geographic_aggregate`].

pub mod cadence;
pub mod error;
pub mod geo;
pub mod history;
pub mod overdue;
pub mod rank_table;
pub mod ranking;
pub mod rare;
pub mod seasonal;
pub mod signal;
pub mod stats;
pub mod streak;
pub mod summary;
pub mod thresholds;

pub use cadence::{detect_dow_patterns, WeekdayBaseline};
pub use error::ThresholdsError;
pub use geo::{
    compute_geographic_aggregate, CadenceDirection, CadenceVariance, ExclusiveFlavor,
    GeographicAggregate, OutlierDirection, OutlierStore, ScopeFlavorCount, ScopeSnapshot,
    StoreMonthFlavor,
};
pub use history::{build_flavor_histories, gap_stats, scope_gap_stats, FlavorHistory, GapStats};
pub use overdue::detect_overdue;
pub use rank_table::FlavorRankTable;
pub use ranking::{compute_store_signals, rank_signals, StoreSnapshot};
pub use rare::{detect_rare_find, parse_store_count};
pub use seasonal::detect_seasonal;
pub use signal::{ActionHint, Evidence, Signal, SignalType};
pub use streak::detect_active_streaks;
pub use summary::{summarize_store, FlavorCount, StoreSummary};
pub use thresholds::{load_thresholds, GeoThresholds, SignalThresholds, Thresholds};
