//! National per-flavor reference counts, precomputed outside this workspace.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::observations::normalize_flavor_key;
use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineFlavor {
    pub appearances: u64,
    pub distinct_stores: u64,
}

/// Read-only national reference: `normalized flavor → counts`, plus the
/// calendar span the counts cover (both ends inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationalBaseline {
    pub span_start: NaiveDate,
    pub span_end: NaiveDate,
    pub flavors: BTreeMap<String, BaselineFlavor>,
}

impl NationalBaseline {
    /// Number of calendar days covered by the baseline, inclusive.
    #[must_use]
    pub fn span_days(&self) -> i64 {
        (self.span_end - self.span_start).num_days() + 1
    }

    /// Look up a flavor. The key is re-normalized first, so a store-side key
    /// that kept punctuation (`"cookies & cream"`) still matches.
    #[must_use]
    pub fn get(&self, flavor_key: &str) -> Option<&BaselineFlavor> {
        self.flavors.get(&normalize_flavor_key(flavor_key))
    }

    /// Expected days between appearances of a flavor at a typical store:
    /// `span_days / (appearances / distinct_stores)`.
    ///
    /// Returns `None` when the flavor is unknown or any term is zero.
    #[must_use]
    pub fn national_avg_gap_days(&self, flavor_normalized: &str) -> Option<f64> {
        let entry = self.get(flavor_normalized)?;
        if entry.appearances == 0 || entry.distinct_stores == 0 {
            return None;
        }
        let span = self.span_days();
        if span <= 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let per_store = entry.appearances as f64 / entry.distinct_stores as f64;
        #[allow(clippy::cast_precision_loss)]
        let gap = span as f64 / per_store;
        (gap.is_finite() && gap > 0.0).then_some(gap)
    }
}

/// Load and validate a national baseline from a JSON file.
///
/// Flavor keys are re-normalized on load so callers can hand-edit the file
/// with display names.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_national_baseline(path: &Path) -> Result<NationalBaseline, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BaselineFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    let raw: NationalBaseline = serde_json::from_str(&content)?;
    validate_baseline(raw)
}

fn validate_baseline(raw: NationalBaseline) -> Result<NationalBaseline, ConfigError> {
    if raw.span_end < raw.span_start {
        return Err(ConfigError::Validation(format!(
            "baseline span_end {} precedes span_start {}",
            raw.span_end, raw.span_start
        )));
    }

    let mut flavors = BTreeMap::new();
    for (key, counts) in raw.flavors {
        let normalized = normalize_flavor_key(&key);
        if normalized.is_empty() {
            return Err(ConfigError::Validation(format!(
                "baseline flavor '{key}' normalizes to an empty key"
            )));
        }
        if flavors.insert(normalized.clone(), counts).is_some() {
            return Err(ConfigError::Validation(format!(
                "duplicate baseline flavor after normalization: '{normalized}'"
            )));
        }
    }

    Ok(NationalBaseline {
        span_start: raw.span_start,
        span_end: raw.span_end,
        flavors,
    })
}
