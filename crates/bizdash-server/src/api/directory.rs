use axum::{
    extract::{Query, State},
    Extension, Json,
};
use bizdash_core::Location;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct LocationsQuery {
    pub brand: Option<String>,
}

/// Locations available for selection, optionally narrowed to one brand.
pub(super) async fn list_locations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LocationsQuery>,
) -> Json<ApiResponse<Vec<Location>>> {
    let data = state
        .provider
        .directory()
        .available(query.brand.as_deref())
        .into_iter()
        .cloned()
        .collect();
    ApiResponse::new(data, req_id.0)
}

pub(super) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<String>>> {
    ApiResponse::new(state.provider.directory().brands(), req_id.0)
}
