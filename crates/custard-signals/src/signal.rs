//! The signal record shared by every detector.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::thresholds::SEASONAL_WINDOW_MONTHS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    Overdue,
    DowPattern,
    Seasonal,
    ActiveStreak,
    RareFind,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Overdue => "overdue",
            Self::DowPattern => "dow_pattern",
            Self::Seasonal => "seasonal",
            Self::ActiveStreak => "active_streak",
            Self::RareFind => "rare_find",
        };
        f.write_str(s)
    }
}

/// What the client should offer the user alongside a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionHint {
    Alert,
    Calendar,
    Directions,
}

/// Type-specific evidence. The variant determines the signal type.
///
/// Numeric fields are rounded for presentation; detectors compare against
/// thresholds before rounding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Evidence {
    Overdue {
        days_since: i64,
        avg_gap_days: f64,
        ratio: f64,
    },
    DowPattern {
        peak_name: String,
        peak_pct: f64,
        chi_squared: f64,
        /// Points above the store baseline on the same weekday, when a
        /// baseline was supplied.
        #[serde(skip_serializing_if = "Option::is_none")]
        lift_pct: Option<f64>,
    },
    Seasonal {
        concentration: f64,
        window_months: [u32; SEASONAL_WINDOW_MONTHS],
        window_label: String,
    },
    ActiveStreak {
        streak_days: u32,
    },
    RareFind {
        store_count: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Display name.
    pub flavor: String,
    pub flavor_key: String,
    pub evidence: Evidence,
}

impl Signal {
    #[must_use]
    pub fn new(flavor: impl Into<String>, flavor_key: impl Into<String>, evidence: Evidence) -> Self {
        Self {
            flavor: flavor.into(),
            flavor_key: flavor_key.into(),
            evidence,
        }
    }

    #[must_use]
    pub fn kind(&self) -> SignalType {
        match self.evidence {
            Evidence::Overdue { .. } => SignalType::Overdue,
            Evidence::DowPattern { .. } => SignalType::DowPattern,
            Evidence::Seasonal { .. } => SignalType::Seasonal,
            Evidence::ActiveStreak { .. } => SignalType::ActiveStreak,
            Evidence::RareFind { .. } => SignalType::RareFind,
        }
    }

    #[must_use]
    pub fn action_hint(&self) -> ActionHint {
        match self.evidence {
            Evidence::Overdue { .. } | Evidence::Seasonal { .. } => ActionHint::Alert,
            Evidence::DowPattern { .. } => ActionHint::Calendar,
            Evidence::ActiveStreak { .. } | Evidence::RareFind { .. } => ActionHint::Directions,
        }
    }

    /// Comparable ranking score. Higher is more interesting.
    #[must_use]
    pub fn score(&self) -> f64 {
        match &self.evidence {
            Evidence::Overdue { ratio, .. } => *ratio,
            Evidence::DowPattern { peak_pct, .. } => *peak_pct,
            Evidence::Seasonal { concentration, .. } => *concentration,
            Evidence::ActiveStreak { streak_days } => f64::from(*streak_days),
            Evidence::RareFind { store_count } => {
                if *store_count == 0 {
                    0.0
                } else {
                    1.0 / f64::from(*store_count)
                }
            }
        }
    }

    #[must_use]
    pub fn headline(&self) -> String {
        let flavor = &self.flavor;
        match &self.evidence {
            Evidence::Overdue { .. } => format!("{flavor} is overdue"),
            Evidence::DowPattern { peak_name, .. } => {
                format!("{flavor} tends to land on {peak_name}s")
            }
            Evidence::Seasonal { window_label, .. } => {
                format!("{flavor} is a {window_label} flavor")
            }
            Evidence::ActiveStreak { streak_days } => {
                format!("{flavor} has been on for {streak_days} days straight")
            }
            Evidence::RareFind { store_count: 1 } => {
                format!("{flavor} is only at this store today")
            }
            Evidence::RareFind { store_count } => {
                format!("{flavor} is at just {store_count} stores today")
            }
        }
    }

    #[must_use]
    pub fn explanation(&self) -> String {
        match &self.evidence {
            Evidence::Overdue {
                days_since,
                avg_gap_days,
                ratio,
            } => format!(
                "Last seen {days_since} days ago. It usually returns every {avg_gap_days:.1} days ({ratio:.1}x the usual wait)."
            ),
            Evidence::DowPattern {
                peak_name,
                peak_pct,
                lift_pct,
                ..
            } => match lift_pct {
                Some(lift) => format!(
                    "{peak_pct:.0}% of appearances fall on a {peak_name}, {lift:.0} points above this store's usual {peak_name} share."
                ),
                None => format!("{peak_pct:.0}% of appearances fall on a {peak_name}."),
            },
            Evidence::Seasonal {
                concentration,
                window_label,
                ..
            } => format!(
                "{:.0}% of appearances fall between {window_label}.",
                concentration * 100.0
            ),
            Evidence::ActiveStreak { streak_days } => {
                format!("Served {streak_days} consecutive days through today or yesterday.")
            }
            Evidence::RareFind { store_count } => {
                format!("Only {store_count} store(s) are serving it today.")
            }
        }
    }
}

impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Signal", 8)?;
        s.serialize_field("type", &self.kind())?;
        s.serialize_field("flavor", &self.flavor)?;
        s.serialize_field("flavor_key", &self.flavor_key)?;
        s.serialize_field("action_hint", &self.action_hint())?;
        s.serialize_field("headline", &self.headline())?;
        s.serialize_field("explanation", &self.explanation())?;
        s.serialize_field("evidence", &self.evidence)?;
        s.serialize_field("score", &self.score())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_hint_follow_evidence() {
        let s = Signal::new("Turtle", "turtle", Evidence::ActiveStreak { streak_days: 3 });
        assert_eq!(s.kind(), SignalType::ActiveStreak);
        assert_eq!(s.action_hint(), ActionHint::Directions);
        assert!((s.score() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rare_find_score_is_inverse_store_count() {
        let one = Signal::new("A", "a", Evidence::RareFind { store_count: 1 });
        let three = Signal::new("A", "a", Evidence::RareFind { store_count: 3 });
        assert!(one.score() > three.score());
        assert!((three.score() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn serializes_type_hint_and_flat_evidence() {
        let s = Signal::new(
            "Turtle",
            "turtle",
            Evidence::Overdue {
                days_since: 20,
                avg_gap_days: 10.0,
                ratio: 2.0,
            },
        );
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "overdue");
        assert_eq!(json["action_hint"], "alert");
        assert_eq!(json["evidence"]["days_since"], 20);
        assert_eq!(json["evidence"]["ratio"], 2.0);
        assert_eq!(json["score"], 2.0);
        assert_eq!(json["headline"], "Turtle is overdue");
    }

    #[test]
    fn dow_evidence_omits_missing_lift() {
        let s = Signal::new(
            "Turtle",
            "turtle",
            Evidence::DowPattern {
                peak_name: "Tuesday".into(),
                peak_pct: 85.7,
                chi_squared: 60.0,
                lift_pct: None,
            },
        );
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "dow_pattern");
        assert_eq!(json["action_hint"], "calendar");
        assert!(json["evidence"].get("lift_pct").is_none());
    }

    #[test]
    fn signal_type_display_matches_wire_name() {
        for kind in [
            SignalType::Overdue,
            SignalType::DowPattern,
            SignalType::Seasonal,
            SignalType::ActiveStreak,
            SignalType::RareFind,
        ] {
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, kind.to_string());
        }
    }
}
