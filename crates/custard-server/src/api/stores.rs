use axum::{
    extract::{Path, State},
    Extension, Json,
};
use custard_core::CoreError;
use custard_signals::{summarize_store, StoreSummary};

use crate::middleware::RequestId;

use super::{map_db_error, today, validation_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn get_store_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<String>,
) -> Result<Json<ApiResponse<StoreSummary>>, ApiError> {
    let store_id = store_id.trim();
    if store_id.is_empty() {
        return Err(validation_error(req_id.0, &CoreError::MissingStoreId));
    }
    let pool = state.require_pool(&req_id.0)?;

    let today = today();
    let snapshot = custard_db::load_store_snapshot(pool, store_id, today)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: summarize_store(&snapshot, today, &state.thresholds.signals),
        meta: ResponseMeta::new(req_id.0),
    }))
}
