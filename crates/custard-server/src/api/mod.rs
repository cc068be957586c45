mod geo;
mod signals;
mod stores;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use custard_core::{AppConfig, CoreError, NationalBaseline};
use custard_db::DbError;
use custard_signals::{FlavorRankTable, Thresholds};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer};

use crate::middleware::{request_id, RequestId};

const MAX_SIGNAL_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct AppState {
    /// `None` when no database is configured. Data routes answer 503.
    pub pool: Option<PgPool>,
    pub config: Arc<AppConfig>,
    pub thresholds: Arc<Thresholds>,
    pub baseline: Option<Arc<NationalBaseline>>,
    pub rank_table: Option<Arc<FlavorRankTable>>,
}

impl AppState {
    /// Build state, deriving the national rank table from the baseline.
    pub fn new(
        config: Arc<AppConfig>,
        pool: Option<PgPool>,
        thresholds: Thresholds,
        baseline: Option<NationalBaseline>,
    ) -> Self {
        let rank_table = baseline
            .as_ref()
            .map(|b| Arc::new(FlavorRankTable::from_baseline(b)));
        Self {
            pool,
            config,
            thresholds: Arc::new(thresholds),
            baseline: baseline.map(Arc::new),
            rank_table,
        }
    }

    pub(super) fn require_pool(&self, request_id: &str) -> Result<&PgPool, ApiError> {
        self.pool.as_ref().ok_or_else(|| {
            ApiError::new(
                request_id,
                "storage_unavailable",
                "observation store is not available",
            )
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    /// Batched reads that failed; the data omits their rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_chunks: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    national_baseline: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            failed_chunks: None,
        }
    }

    pub(super) fn with_failed_chunks(mut self, failed_chunks: usize) -> Self {
        self.failed_chunks = (failed_chunks > 0).then_some(failed_chunks);
        self
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "storage_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>, default: usize) -> usize {
    let default = i64::try_from(default).unwrap_or(MAX_SIGNAL_LIMIT);
    let clamped = limit.unwrap_or(default).clamp(1, MAX_SIGNAL_LIMIT);
    usize::try_from(clamped).unwrap_or(1)
}

pub(super) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub(super) fn validation_error(request_id: String, error: &CoreError) -> ApiError {
    ApiError::new(request_id, "validation_error", error.to_string())
}

pub(super) fn map_db_error(request_id: String, error: &DbError) -> ApiError {
    match error {
        DbError::Core(CoreError::UnknownStore(_)) | DbError::NotFound => {
            ApiError::new(request_id, "not_found", error.to_string())
        }
        DbError::Core(core) => validation_error(request_id, core),
        DbError::MissingDatabaseUrl
        | DbError::Sqlx(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
            tracing::warn!(error = %error, "observation store unreachable");
            ApiError::new(
                request_id,
                "storage_unavailable",
                "observation store is not available",
            )
        }
        _ => {
            tracing::error!(error = %error, "database query failed");
            ApiError::new(request_id, "internal_error", "database query failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn cache_control(max_age_secs: u64) -> HeaderValue {
    HeaderValue::from_str(&format!("public, max-age={max_age_secs}"))
        .unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
}

/// Successful responses are cacheable; errors never are.
fn cache_successes(value: HeaderValue) -> impl Fn(&Response<Body>) -> Option<HeaderValue> + Clone {
    move |res: &Response<Body>| res.status().is_success().then(|| value.clone())
}

fn data_router(cache_max_age_secs: u64) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/stores/{store_id}/signals",
            get(signals::list_store_signals),
        )
        .route(
            "/api/v1/stores/{store_id}/summary",
            get(stores::get_store_summary),
        )
        .route("/api/v1/geo", get(geo::get_geo_aggregate))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            cache_successes(cache_control(cache_max_age_secs)),
        ))
}

pub fn build_app(state: AppState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(data_router(state.config.cache_max_age_secs))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let national_baseline = if state.baseline.is_some() {
        "loaded"
    } else {
        "absent"
    };

    let Some(pool) = state.pool.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                data: HealthData {
                    status: "degraded",
                    database: "unconfigured",
                    national_baseline,
                },
                meta,
            }),
        );
    };

    match custard_db::health_check(pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                    national_baseline,
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                        national_baseline,
                    },
                    meta,
                }),
            )
        }
    }
}
