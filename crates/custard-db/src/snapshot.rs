//! One-shot snapshot loaders. Each request fetches its snapshot once and
//! hands it to the pure computations in `custard-signals`.

use chrono::NaiveDate;
use custard_core::{is_closed_marker, CoreError, Observation, ScopeRequest};
use custard_signals::{ScopeSnapshot, StoreSnapshot};
use sqlx::PgPool;

use crate::batch::fetch_chunked;
use crate::observations::{
    count_stores_serving, list_scope_flavor_counts, list_scope_month_flavors,
    list_scope_observations, list_store_observations, ReadWindow,
};
use crate::stores::{get_store_meta, resolve_scope};
use crate::DbError;

/// Load everything the per-store detectors need.
///
/// The distinct-store count for today's flavor is best-effort: if that read
/// fails the snapshot is returned without it and the rare-find check is
/// skipped.
///
/// # Errors
///
/// Returns [`CoreError::UnknownStore`] (wrapped in [`DbError::Core`]) if the
/// store does not exist, or [`DbError::Sqlx`] if the history read fails.
pub async fn load_store_snapshot(
    pool: &PgPool,
    store_id: &str,
    today: NaiveDate,
) -> Result<StoreSnapshot, DbError> {
    if get_store_meta(pool, store_id).await?.is_none() {
        return Err(CoreError::UnknownStore(store_id.to_string()).into());
    }

    let rows = list_store_observations(pool, store_id).await?;

    // The count query matches the stored column, so use the raw key.
    let todays = rows
        .iter()
        .find(|r| r.flavor_date == today && !is_closed_marker(&r.flavor_display))
        .cloned();

    let todays_store_count = match &todays {
        Some(row) => match count_stores_serving(pool, &row.flavor_normalized, today).await {
            Ok(n) => u32::try_from(n).ok(),
            Err(e) => {
                tracing::warn!(store_id, error = %e, "store count for today's flavor unavailable");
                None
            }
        },
        None => None,
    };

    let observations: Vec<Observation> = rows.into_iter().map(Observation::from).collect();

    Ok(StoreSnapshot {
        store_id: store_id.to_string(),
        observations,
        todays_flavor: todays.map(|r| r.flavor_display),
        todays_store_count,
    })
}

/// Resolve a scope and load its grouped counts, dated observations and
/// month buckets for the `lookback_days` days ending on `today` (inclusive).
///
/// Reads are split into chunks of `chunk_size` store ids. Failed chunks are
/// counted in [`ScopeSnapshot::failed_chunks`] rather than failing the load.
///
/// # Errors
///
/// Returns [`DbError::Core`] if the scope resolves to no stores, or
/// [`DbError::Sqlx`] if scope resolution itself fails.
pub async fn load_scope_snapshot(
    pool: &PgPool,
    request: &ScopeRequest,
    today: NaiveDate,
    lookback_days: u32,
    chunk_size: usize,
) -> Result<ScopeSnapshot, DbError> {
    let store_ids = resolve_scope(pool, request).await?;
    let window = ReadWindow::ending_on(today, lookback_days);

    let (counts, observations, months) = futures::join!(
        fetch_chunked(&store_ids, chunk_size, move |chunk| async move {
            list_scope_flavor_counts(pool, &chunk, window).await
        }),
        fetch_chunked(&store_ids, chunk_size, move |chunk| async move {
            list_scope_observations(pool, &chunk, window).await
        }),
        fetch_chunked(&store_ids, chunk_size, move |chunk| async move {
            list_scope_month_flavors(pool, &chunk, window).await
        }),
    );

    let failed_chunks = counts.failed_chunks + observations.failed_chunks + months.failed_chunks;
    if failed_chunks > 0 {
        tracing::warn!(
            scope = %request.label(),
            failed_chunks,
            "scope snapshot is incomplete"
        );
    }

    Ok(ScopeSnapshot {
        label: request.label(),
        store_ids,
        flavor_counts: counts.rows.into_iter().map(Into::into).collect(),
        observations: observations
            .rows
            .into_iter()
            .filter(|row| window.contains(row.flavor_date))
            .map(Into::into)
            .collect(),
        month_flavors: months.rows.into_iter().map(Into::into).collect(),
        failed_chunks,
    })
}
