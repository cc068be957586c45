use custard_core::normalize_flavor_key;

use crate::signal::{Evidence, Signal};
use crate::thresholds::SignalThresholds;

/// Flag today's flavor when only a handful of stores are serving it.
///
/// A missing or blank flavor, or a missing count, yields nothing.
#[must_use]
pub fn detect_rare_find(
    flavor: Option<&str>,
    store_count: Option<u32>,
    thresholds: &SignalThresholds,
) -> Option<Signal> {
    let flavor = flavor.map(str::trim).filter(|f| !f.is_empty())?;
    let store_count = store_count?;
    if store_count == 0 || store_count > thresholds.max_rare_stores {
        return None;
    }
    Some(Signal::new(
        flavor,
        normalize_flavor_key(flavor),
        Evidence::RareFind { store_count },
    ))
}

/// Parse a store count as delivered by upstream feeds, which sometimes send
/// it as text. Non-numeric input yields `None`.
#[must_use]
pub fn parse_store_count(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}
