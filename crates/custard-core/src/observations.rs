use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One store serving one flavor on one calendar day.
///
/// Upstream guarantees at most one observation per `(store_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub store_id: String,
    pub date: NaiveDate,
    /// Flavor name as published, e.g. `"Turtle Sundae!"`.
    pub flavor_display: String,
    /// Output of [`normalize_flavor_key`] for `flavor_display`.
    pub flavor_normalized: String,
}

impl Observation {
    /// Build an observation, deriving the normalized key from the display name.
    #[must_use]
    pub fn new(store_id: impl Into<String>, date: NaiveDate, flavor_display: &str) -> Self {
        Self {
            store_id: store_id.into(),
            date,
            flavor_display: flavor_display.trim().to_string(),
            flavor_normalized: normalize_flavor_key(flavor_display),
        }
    }
}

/// Normalize a flavor title into a comparison key.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single space and trims the result: `"Turtle!!  Sundae"` → `"turtle sundae"`.
#[must_use]
pub fn normalize_flavor_key(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns `true` for the sentinel titles stores publish on days they are
/// closed (e.g. `"z *Restaurant Closed Today"`). These are not flavors.
#[must_use]
pub fn is_closed_marker(title: &str) -> bool {
    let lowered = title.to_lowercase();
    lowered.contains("closed today") || lowered.contains("closed for remodel")
}
