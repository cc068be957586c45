use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use custard_core::CoreError;
use custard_signals::{compute_store_signals, Signal};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, today, validation_error, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

#[derive(Debug, Serialize)]
pub(super) struct StoreSignals {
    store_id: String,
    as_of: NaiveDate,
    signals: Vec<Signal>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SignalQuery {
    pub limit: Option<i64>,
}

pub(super) async fn list_store_signals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<String>,
    Query(query): Query<SignalQuery>,
) -> Result<Json<ApiResponse<StoreSignals>>, ApiError> {
    let store_id = store_id.trim().to_string();
    if store_id.is_empty() {
        return Err(validation_error(req_id.0, &CoreError::MissingStoreId));
    }
    let limit = normalize_limit(query.limit, state.config.signal_limit);
    let pool = state.require_pool(&req_id.0)?;

    let today = today();
    let snapshot = custard_db::load_store_snapshot(pool, &store_id, today)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let signals = compute_store_signals(&snapshot, today, &state.thresholds.signals, limit);
    tracing::info!(store_id = %store_id, signals = signals.len(), "served store signals");

    Ok(Json(ApiResponse {
        data: StoreSignals {
            store_id,
            as_of: today,
            signals,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
