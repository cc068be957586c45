use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Geographic metadata for a store, as returned by the scope resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMeta {
    pub store_id: String,
    pub name: Option<String>,
    pub city: Option<String>,
    /// Two-letter state code, upper-cased.
    pub state: Option<String>,
    pub metro: Option<String>,
}

/// Aggregation level over stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeType {
    Store,
    Metro,
    State,
    National,
}

impl ScopeType {
    /// Whether resolving this scope needs a region value.
    #[must_use]
    pub fn requires_region(self) -> bool {
        !matches!(self, ScopeType::National)
    }
}

impl std::fmt::Display for ScopeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeType::Store => write!(f, "store"),
            ScopeType::Metro => write!(f, "metro"),
            ScopeType::State => write!(f, "state"),
            ScopeType::National => write!(f, "national"),
        }
    }
}

impl std::str::FromStr for ScopeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "store" => Ok(ScopeType::Store),
            "metro" => Ok(ScopeType::Metro),
            "state" => Ok(ScopeType::State),
            "national" => Ok(ScopeType::National),
            _ => Err(CoreError::InvalidScope(s.to_string())),
        }
    }
}

/// A validated `(scope_type, region)` pair, ready for the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRequest {
    pub scope: ScopeType,
    /// Normalized region: upper-case state code, lower-case metro slug, the raw
    /// store id, or `None` for national.
    pub region: Option<String>,
}

impl ScopeRequest {
    /// Validate raw query inputs. Never silently defaults an unknown scope.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidScope`] for an unrecognized scope and
    /// [`CoreError::MissingRegion`] when a regional scope has no region.
    pub fn parse(scope: &str, region: Option<&str>) -> Result<Self, CoreError> {
        let scope: ScopeType = scope.parse()?;
        let region = region.map(str::trim).filter(|r| !r.is_empty());

        let region = match (scope, region) {
            (ScopeType::National, _) => None,
            (_, None) => return Err(CoreError::MissingRegion(scope)),
            (ScopeType::State, Some(r)) => Some(r.to_uppercase()),
            (ScopeType::Metro, Some(r)) => Some(r.to_lowercase()),
            (ScopeType::Store, Some(r)) => Some(r.to_string()),
        };

        Ok(Self { scope, region })
    }

    /// Human-readable label, e.g. `"state:WI"` or `"national"`.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.region {
            Some(region) => format!("{}:{region}", self.scope),
            None => self.scope.to_string(),
        }
    }
}
