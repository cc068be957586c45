//! National popularity ranks, derived from a baseline and tagged with a
//! fingerprint of that baseline.
//!
//! The table is a plain value. Callers build it from the baseline they hold
//! and pass both into [`crate::compute_geographic_aggregate`], which drops
//! ranks from a table whose `snapshot_id` no longer matches the baseline.

use std::collections::BTreeMap;

use custard_core::{normalize_flavor_key, NationalBaseline};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavorRankTable {
    /// Hex SHA-256 of the baseline content the ranks were computed from.
    pub snapshot_id: String,
    ranks: BTreeMap<String, u32>,
}

impl FlavorRankTable {
    /// Rank flavors by national appearances descending, then key ascending.
    /// Rank 1 is the most common flavor.
    #[must_use]
    pub fn from_baseline(baseline: &NationalBaseline) -> Self {
        let mut ordered: Vec<(&String, u64)> = baseline
            .flavors
            .iter()
            .map(|(key, counts)| (key, counts.appearances))
            .collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let ranks = ordered
            .into_iter()
            .zip(1u32..)
            .map(|((key, _), rank)| (key.clone(), rank))
            .collect();

        Self {
            snapshot_id: fingerprint(baseline),
            ranks,
        }
    }

    #[must_use]
    pub fn rank(&self, flavor_key: &str) -> Option<u32> {
        self.ranks.get(&normalize_flavor_key(flavor_key)).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Whether this table was computed from `baseline`.
    #[must_use]
    pub fn is_current_for(&self, baseline: &NationalBaseline) -> bool {
        self.snapshot_id == fingerprint(baseline)
    }
}

/// Content fingerprint of a baseline. Identical content always hashes the
/// same because flavors are iterated in key order.
#[must_use]
fn fingerprint(baseline: &NationalBaseline) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{}\n", baseline.span_start, baseline.span_end));
    for (key, counts) in &baseline.flavors {
        hasher.update(format!(
            "{key}\t{}\t{}\n",
            counts.appearances, counts.distinct_stores
        ));
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use custard_core::BaselineFlavor;

    fn baseline(entries: &[(&str, u64)]) -> NationalBaseline {
        NationalBaseline {
            span_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            span_end: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            flavors: entries
                .iter()
                .map(|(k, n)| {
                    (
                        (*k).to_string(),
                        BaselineFlavor {
                            appearances: *n,
                            distinct_stores: 10,
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn ranks_by_appearances_then_name() {
        let table = FlavorRankTable::from_baseline(&baseline(&[
            ("turtle", 50),
            ("andes mint", 80),
            ("butter pecan", 50),
        ]));
        assert_eq!(table.rank("andes mint"), Some(1));
        assert_eq!(table.rank("butter pecan"), Some(2));
        assert_eq!(table.rank("turtle"), Some(3));
        assert_eq!(table.rank("Butter-Pecan!"), Some(2));
        assert_eq!(table.rank("unknown"), None);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let a = baseline(&[("turtle", 50)]);
        let b = baseline(&[("turtle", 51)]);
        assert_eq!(fingerprint(&a), fingerprint(&a.clone()));
        assert_ne!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a).len(), 64);

        let table = FlavorRankTable::from_baseline(&a);
        assert!(table.is_current_for(&a));
        assert!(!table.is_current_for(&b));
    }
}
