//! Scope resolution against the `stores` table.

use custard_core::{CoreError, ScopeRequest, ScopeType, StoreMeta};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub store_id: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub metro: Option<String>,
}

impl From<StoreRow> for StoreMeta {
    fn from(row: StoreRow) -> Self {
        Self {
            store_id: row.store_id,
            name: row.name,
            city: row.city,
            state: row.state.map(|s| s.to_uppercase()),
            metro: row.metro,
        }
    }
}

/// Fetch a single store's metadata. Returns `None` if the store is unknown.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_store_meta(
    pool: &PgPool,
    store_id: &str,
) -> Result<Option<StoreMeta>, sqlx::Error> {
    let row = sqlx::query_as::<_, StoreRow>(
        "SELECT store_id, name, city, state, metro \
         FROM stores \
         WHERE store_id = $1",
    )
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(StoreMeta::from))
}

/// Map a validated scope request to the store ids it covers, sorted.
///
/// # Errors
///
/// Returns [`DbError::Core`] with [`CoreError::UnknownStore`] for an unknown
/// store scope, [`CoreError::EmptyScope`] when a region matches no stores, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn resolve_scope(pool: &PgPool, request: &ScopeRequest) -> Result<Vec<String>, DbError> {
    let region = request.region.clone().unwrap_or_default();

    let ids = match request.scope {
        ScopeType::Store => {
            sqlx::query_scalar::<_, String>("SELECT store_id FROM stores WHERE store_id = $1")
                .bind(&region)
                .fetch_all(pool)
                .await?
        }
        ScopeType::Metro => {
            sqlx::query_scalar::<_, String>(
                "SELECT store_id FROM stores WHERE LOWER(metro) = $1 ORDER BY store_id",
            )
            .bind(&region)
            .fetch_all(pool)
            .await?
        }
        ScopeType::State => {
            sqlx::query_scalar::<_, String>(
                "SELECT store_id FROM stores WHERE UPPER(state) = $1 ORDER BY store_id",
            )
            .bind(&region)
            .fetch_all(pool)
            .await?
        }
        ScopeType::National => {
            sqlx::query_scalar::<_, String>("SELECT store_id FROM stores ORDER BY store_id")
                .fetch_all(pool)
                .await?
        }
    };

    if ids.is_empty() {
        let err = match request.scope {
            ScopeType::Store => CoreError::UnknownStore(region),
            scope => CoreError::EmptyScope { scope, region },
        };
        return Err(err.into());
    }

    tracing::debug!(scope = %request.label(), stores = ids.len(), "resolved scope");
    Ok(ids)
}
