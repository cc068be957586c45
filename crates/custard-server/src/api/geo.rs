use axum::{
    extract::{Query, State},
    Extension, Json,
};
use custard_core::ScopeRequest;
use custard_signals::{compute_geographic_aggregate, GeographicAggregate};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, today, validation_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct GeoQuery {
    pub scope: Option<String>,
    pub region: Option<String>,
}

pub(super) async fn get_geo_aggregate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GeoQuery>,
) -> Result<Json<ApiResponse<GeographicAggregate>>, ApiError> {
    let Some(scope) = query.scope.as_deref().filter(|s| !s.trim().is_empty()) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "scope is required; expected one of store, metro, state, national",
        ));
    };
    let request = ScopeRequest::parse(scope, query.region.as_deref())
        .map_err(|e| validation_error(req_id.0.clone(), &e))?;
    let pool = state.require_pool(&req_id.0)?;

    let snapshot = custard_db::load_scope_snapshot(
        pool,
        &request,
        today(),
        state.config.geo_lookback_days,
        state.config.query_chunk_size,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let aggregate = compute_geographic_aggregate(
        &snapshot,
        state.baseline.as_deref(),
        state.rank_table.as_deref(),
        &state.thresholds.geo,
    );
    tracing::info!(
        scope = %aggregate.scope_label,
        stores = aggregate.store_count,
        failed_chunks = snapshot.failed_chunks,
        "served geographic aggregate"
    );

    Ok(Json(ApiResponse {
        data: aggregate,
        meta: ResponseMeta::new(req_id.0).with_failed_chunks(snapshot.failed_chunks),
    }))
}
