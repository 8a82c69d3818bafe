mod dashboard;
mod directory;
mod filter;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use bizdash_gbp::{DataProvider, GbpError};
use bizdash_sentiment::{GeminiClassifier, SentimentError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};
use crate::session::{Session, StaleSelection};

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<DataProvider>,
    pub classifier: Option<GeminiClassifier>,
    pub session: Arc<Session>,
}

impl AppState {
    #[must_use]
    pub fn new(
        provider: DataProvider,
        classifier: Option<GeminiClassifier>,
        session: Session,
    ) -> Self {
        Self {
            provider: Arc::new(provider),
            classifier,
            session: Arc::new(session),
        }
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
    data_source: String,
    classifier: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
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
            "not_found" | "empty_scope" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "stale_selection" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            "classifier_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_provider_error(request_id: String, error: &GbpError) -> ApiError {
    if error.is_empty_result() {
        return ApiError::new(request_id, "empty_scope", error.to_string());
    }
    tracing::error!(error = %error, "dashboard data fetch failed");
    ApiError::new(request_id, "upstream_error", error.to_string())
}

pub(super) fn map_classifier_error(request_id: String, error: &SentimentError) -> ApiError {
    tracing::error!(error = %error, "sentiment classification failed");
    ApiError::new(request_id, "upstream_error", error.to_string())
}

pub(super) fn stale_error(request_id: String, stale: StaleSelection) -> ApiError {
    ApiError::new(
        request_id,
        "stale_selection",
        format!(
            "filter changed while the request was running (generation {} is now {})",
            stale.requested, stale.current
        ),
    )
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([header::CONTENT_DISPOSITION])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/locations", get(directory::list_locations))
        .route("/api/v1/brands", get(directory::list_brands))
        .route(
            "/api/v1/filter",
            get(filter::get_filter).put(filter::replace_filter),
        )
        .route("/api/v1/dashboard", get(dashboard::get_dashboard))
        .route(
            "/api/v1/reviews/analyze",
            post(dashboard::analyze_reviews),
        )
        .route("/api/v1/export.xlsx", get(dashboard::export_workbook))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    ApiResponse::new(
        HealthData {
            status: "ok",
            data_source: state.provider.kind().to_string(),
            classifier: if state.classifier.is_some() {
                "configured"
            } else {
                "disabled"
            },
        },
        req_id.0,
    )
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
