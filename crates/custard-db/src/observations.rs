//! Read operations for the `flavor_observations` table.

use chrono::{Duration, NaiveDate};
use custard_core::{normalize_flavor_key, Observation};
use custard_signals::{ScopeFlavorCount, StoreMonthFlavor};
use sqlx::PgPool;

/// A row from the `flavor_observations` table.
///
/// `flavor_normalized` is stored as upstream wrote it, which may keep
/// punctuation (`"cookies & cream"`). Conversions into engine types re-key it
/// with [`normalize_flavor_key`] so it matches national baseline keys.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ObservationRow {
    pub store_id: String,
    pub flavor_date: NaiveDate,
    pub flavor_display: String,
    pub flavor_normalized: String,
}

impl From<ObservationRow> for Observation {
    fn from(row: ObservationRow) -> Self {
        Self {
            store_id: row.store_id,
            date: row.flavor_date,
            flavor_display: row.flavor_display,
            flavor_normalized: normalize_flavor_key(&row.flavor_normalized),
        }
    }
}

/// Appearance count per `(store, flavor, display name)` within a window.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FlavorCountRow {
    pub store_id: String,
    pub flavor_normalized: String,
    pub flavor_display: String,
    pub appearances: i64,
}

impl From<FlavorCountRow> for ScopeFlavorCount {
    fn from(row: FlavorCountRow) -> Self {
        Self {
            store_id: row.store_id,
            flavor_normalized: normalize_flavor_key(&row.flavor_normalized),
            flavor_display: row.flavor_display,
            count: u64::try_from(row.appearances).unwrap_or(0),
        }
    }
}

/// Distinct `(store, year, month, flavor)` tuple.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthFlavorRow {
    pub store_id: String,
    pub year: i32,
    pub month: i32,
    pub flavor_normalized: String,
}

impl From<MonthFlavorRow> for StoreMonthFlavor {
    fn from(row: MonthFlavorRow) -> Self {
        Self {
            store_id: row.store_id,
            year: row.year,
            month: u32::try_from(row.month).unwrap_or(0),
            flavor_normalized: normalize_flavor_key(&row.flavor_normalized),
        }
    }
}

/// Inclusive date range for scope reads: `lookback_days` before the
/// reference day through the reference day itself. Rows dated after the
/// reference day are never part of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadWindow {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl ReadWindow {
    #[must_use]
    pub fn ending_on(today: NaiveDate, lookback_days: u32) -> Self {
        Self {
            since: today - Duration::days(i64::from(lookback_days)),
            until: today,
        }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.since <= date && date <= self.until
    }
}

/// Every observation for one store, oldest first.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_store_observations(
    pool: &PgPool,
    store_id: &str,
) -> Result<Vec<ObservationRow>, sqlx::Error> {
    sqlx::query_as::<_, ObservationRow>(
        "SELECT store_id, flavor_date, flavor_display, flavor_normalized \
         FROM flavor_observations \
         WHERE store_id = $1 \
         ORDER BY flavor_date ASC",
    )
    .bind(store_id)
    .fetch_all(pool)
    .await
}

/// Number of distinct stores serving a flavor on a given day.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_stores_serving(
    pool: &PgPool,
    flavor_normalized: &str,
    date: NaiveDate,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT store_id) \
         FROM flavor_observations \
         WHERE flavor_normalized = $1 AND flavor_date = $2",
    )
    .bind(flavor_normalized)
    .bind(date)
    .fetch_one(pool)
    .await
}

/// Observations for a set of stores within `window`.
///
/// Ordered by store then date so chunked results concatenate deterministically.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_scope_observations(
    pool: &PgPool,
    store_ids: &[String],
    window: ReadWindow,
) -> Result<Vec<ObservationRow>, sqlx::Error> {
    sqlx::query_as::<_, ObservationRow>(
        "SELECT store_id, flavor_date, flavor_display, flavor_normalized \
         FROM flavor_observations \
         WHERE store_id = ANY($1) AND flavor_date BETWEEN $2 AND $3 \
         ORDER BY store_id ASC, flavor_date ASC",
    )
    .bind(store_ids)
    .bind(window.since)
    .bind(window.until)
    .fetch_all(pool)
    .await
}

/// Grouped appearance counts per store and flavor within `window`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_scope_flavor_counts(
    pool: &PgPool,
    store_ids: &[String],
    window: ReadWindow,
) -> Result<Vec<FlavorCountRow>, sqlx::Error> {
    sqlx::query_as::<_, FlavorCountRow>(
        "SELECT store_id, flavor_normalized, flavor_display, COUNT(*) AS appearances \
         FROM flavor_observations \
         WHERE store_id = ANY($1) AND flavor_date BETWEEN $2 AND $3 \
         GROUP BY store_id, flavor_normalized, flavor_display \
         ORDER BY store_id ASC, flavor_normalized ASC, flavor_display ASC",
    )
    .bind(store_ids)
    .bind(window.since)
    .bind(window.until)
    .fetch_all(pool)
    .await
}

/// Distinct flavors per store and calendar month within `window`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_scope_month_flavors(
    pool: &PgPool,
    store_ids: &[String],
    window: ReadWindow,
) -> Result<Vec<MonthFlavorRow>, sqlx::Error> {
    sqlx::query_as::<_, MonthFlavorRow>(
        "SELECT DISTINCT store_id, \
                EXTRACT(YEAR FROM flavor_date)::int AS year, \
                EXTRACT(MONTH FROM flavor_date)::int AS month, \
                flavor_normalized \
         FROM flavor_observations \
         WHERE store_id = ANY($1) AND flavor_date BETWEEN $2 AND $3 \
         ORDER BY store_id ASC, year ASC, month ASC, flavor_normalized ASC",
    )
    .bind(store_ids)
    .bind(window.since)
    .bind(window.until)
    .fetch_all(pool)
    .await
}
