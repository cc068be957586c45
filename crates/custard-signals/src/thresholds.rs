//! Detector and aggregator thresholds.
//!
//! Each threshold is a named constant. The same values are the defaults of
//! [`SignalThresholds`] and [`GeoThresholds`], which can be overridden from a
//! YAML file so the heuristics can be recalibrated without a rebuild.

use std::path::Path;

use serde::Deserialize;

use crate::error::ThresholdsError;

/// Minimum appearances before the overdue detector considers a flavor.
pub const MIN_APPEARANCES: usize = 3;
/// `days_since / avg_gap` at or above which a flavor is overdue.
pub const OVERDUE_RATIO: f64 = 1.5;

/// Minimum appearances before the weekday detector considers a flavor.
pub const MIN_DOW_APPEARANCES: usize = 12;
/// Minimum distinct calendar dates behind those appearances.
pub const MIN_DOW_DISTINCT_DAYS: usize = 2;
pub const MIN_DOW_PEAK_PCT: f64 = 45.0;
pub const MAX_DOW_PEAK_PCT: f64 = 90.0;
/// Chi-squared critical value, 6 degrees of freedom, 95% confidence.
pub const CHI_SQUARED_CRITICAL_DF6: f64 = 12.592;
/// A store baseline whose own peak weekday reaches this share is day-biased
/// as a whole; no flavor-level weekday signal is emitted for it.
pub const MAX_BASELINE_PEAK_PCT: f64 = 65.0;
/// Points a flavor's peak weekday share must exceed the baseline's share on
/// that same weekday.
pub const MIN_DOW_PEAK_LIFT_PCT: f64 = 20.0;
/// Without a baseline, a peak share at or above this value spread over at
/// most [`FIXED_SCHEDULE_MAX_ACTIVE_WEEKDAYS`] weekdays is treated as a fixed
/// weekly schedule rather than a preference. Empirically tuned.
pub const FIXED_SCHEDULE_PEAK_PCT: f64 = 87.5;
/// See [`FIXED_SCHEDULE_PEAK_PCT`].
pub const FIXED_SCHEDULE_MAX_ACTIVE_WEEKDAYS: usize = 2;

pub const MIN_SEASONAL_APPEARANCES: usize = 6;
/// Width of the seasonal window in calendar months.
pub const SEASONAL_WINDOW_MONTHS: usize = 3;
pub const MIN_SEASONAL_CONCENTRATION: f64 = 0.5;

pub const MIN_STREAK_DAYS: u32 = 2;
pub const MAX_RARE_STORES: u32 = 3;
pub const DEFAULT_SIGNAL_LIMIT: usize = 10;

/// Share of scope stores a flavor must reach to count as exclusive.
pub const EXCLUSIVE_MIN_STORE_PCT: f64 = 50.0;
/// Cap applied to each geographic list.
pub const GEO_MAX_RESULTS: usize = 20;
pub const CADENCE_MIN_APPEARANCES: usize = 5;
/// Variance ratios at or outside these bounds indicate too little data.
pub const CADENCE_MIN_RATIO: f64 = 0.3;
pub const CADENCE_MAX_RATIO: f64 = 10.0;
pub const OUTLIER_MIN_MONTHS: usize = 2;
pub const OUTLIER_MIN_STORES: usize = 3;
pub const OUTLIER_Z_THRESHOLD: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalThresholds {
    pub min_appearances: usize,
    pub overdue_ratio: f64,
    pub min_dow_appearances: usize,
    pub min_dow_distinct_days: usize,
    pub min_dow_peak_pct: f64,
    pub max_dow_peak_pct: f64,
    pub chi_squared_critical: f64,
    pub max_baseline_peak_pct: f64,
    pub min_dow_peak_lift_pct: f64,
    pub fixed_schedule_peak_pct: f64,
    pub fixed_schedule_max_active_weekdays: usize,
    pub min_seasonal_appearances: usize,
    pub min_seasonal_concentration: f64,
    pub min_streak_days: u32,
    pub max_rare_stores: u32,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            min_appearances: MIN_APPEARANCES,
            overdue_ratio: OVERDUE_RATIO,
            min_dow_appearances: MIN_DOW_APPEARANCES,
            min_dow_distinct_days: MIN_DOW_DISTINCT_DAYS,
            min_dow_peak_pct: MIN_DOW_PEAK_PCT,
            max_dow_peak_pct: MAX_DOW_PEAK_PCT,
            chi_squared_critical: CHI_SQUARED_CRITICAL_DF6,
            max_baseline_peak_pct: MAX_BASELINE_PEAK_PCT,
            min_dow_peak_lift_pct: MIN_DOW_PEAK_LIFT_PCT,
            fixed_schedule_peak_pct: FIXED_SCHEDULE_PEAK_PCT,
            fixed_schedule_max_active_weekdays: FIXED_SCHEDULE_MAX_ACTIVE_WEEKDAYS,
            min_seasonal_appearances: MIN_SEASONAL_APPEARANCES,
            min_seasonal_concentration: MIN_SEASONAL_CONCENTRATION,
            min_streak_days: MIN_STREAK_DAYS,
            max_rare_stores: MAX_RARE_STORES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeoThresholds {
    pub exclusive_min_store_pct: f64,
    pub max_results: usize,
    pub cadence_min_appearances: usize,
    pub cadence_min_ratio: f64,
    pub cadence_max_ratio: f64,
    pub outlier_min_months: usize,
    pub outlier_min_stores: usize,
    pub outlier_z_threshold: f64,
}

impl Default for GeoThresholds {
    fn default() -> Self {
        Self {
            exclusive_min_store_pct: EXCLUSIVE_MIN_STORE_PCT,
            max_results: GEO_MAX_RESULTS,
            cadence_min_appearances: CADENCE_MIN_APPEARANCES,
            cadence_min_ratio: CADENCE_MIN_RATIO,
            cadence_max_ratio: CADENCE_MAX_RATIO,
            outlier_min_months: OUTLIER_MIN_MONTHS,
            outlier_min_stores: OUTLIER_MIN_STORES,
            outlier_z_threshold: OUTLIER_Z_THRESHOLD,
        }
    }
}

/// Top-level thresholds document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    pub signals: SignalThresholds,
    pub geo: GeoThresholds,
}

impl Thresholds {
    /// Reject combinations that would make a detector unreachable or divide
    /// by zero.
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdsError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ThresholdsError> {
        let s = &self.signals;
        let g = &self.geo;

        if s.min_appearances < 2 {
            return Err(invalid("signals.min_appearances must be at least 2"));
        }
        if s.overdue_ratio <= 0.0 {
            return Err(invalid("signals.overdue_ratio must be positive"));
        }
        if s.min_dow_peak_pct > s.max_dow_peak_pct {
            return Err(invalid(
                "signals.min_dow_peak_pct must not exceed signals.max_dow_peak_pct",
            ));
        }
        if !(0.0..=100.0).contains(&s.max_baseline_peak_pct) {
            return Err(invalid(
                "signals.max_baseline_peak_pct must be within 0..=100",
            ));
        }
        if !(0.0..=1.0).contains(&s.min_seasonal_concentration) {
            return Err(invalid(
                "signals.min_seasonal_concentration must be within 0..=1",
            ));
        }
        if s.max_rare_stores == 0 {
            return Err(invalid("signals.max_rare_stores must be at least 1"));
        }
        if g.max_results == 0 {
            return Err(invalid("geo.max_results must be at least 1"));
        }
        if g.cadence_min_ratio <= 0.0 || g.cadence_min_ratio >= g.cadence_max_ratio {
            return Err(invalid(
                "geo.cadence_min_ratio must be positive and below geo.cadence_max_ratio",
            ));
        }
        if g.outlier_min_stores < 2 {
            return Err(invalid("geo.outlier_min_stores must be at least 2"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ThresholdsError {
    ThresholdsError::Invalid(message.to_string())
}

/// Load and validate thresholds from a YAML file. Omitted fields keep their
/// documented defaults.
///
/// # Errors
///
/// Returns [`ThresholdsError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_thresholds(path: &Path) -> Result<Thresholds, ThresholdsError> {
    let content = std::fs::read_to_string(path).map_err(|e| ThresholdsError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_thresholds(&content)
}

fn parse_thresholds(content: &str) -> Result<Thresholds, ThresholdsError> {
    let thresholds: Thresholds = serde_yaml::from_str(content)?;
    thresholds.validate()?;
    Ok(thresholds)
}
