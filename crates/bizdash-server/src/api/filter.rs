//! Reading and replacing the session filter.

use axum::{extract::State, Extension, Json};
use bizdash_core::{DateRange, EntityScope, Filter};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct FilterRequest {
    #[serde(default = "all_locations")]
    pub scope: EntityScope,
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(default)]
    pub compare: Option<CompareRequest>,
}

/// `"previous"` or an explicit `{ "from", "to" }` range.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum CompareRequest {
    Preset(ComparePreset),
    Range { from: NaiveDate, to: NaiveDate },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(super) enum ComparePreset {
    Previous,
}

#[derive(Debug, Serialize)]
pub(super) struct FilterData {
    pub generation: u64,
    #[serde(flatten)]
    pub filter: Filter,
}

fn all_locations() -> EntityScope {
    EntityScope::All
}

impl FilterRequest {
    fn into_filter(self) -> Result<Filter, String> {
        let range = DateRange::new(self.from, self.to).map_err(|e| e.to_string())?;
        let filter = Filter::new(self.scope, range);
        Ok(match self.compare {
            None => filter,
            Some(CompareRequest::Preset(ComparePreset::Previous)) => filter
                .with_default_comparison()
                .map_err(|e| format!("comparison: {e}"))?,
            Some(CompareRequest::Range { from, to }) => {
                let comparison = DateRange::new(from, to)
                    .map_err(|e| format!("comparison: {e}"))?;
                filter.with_comparison(comparison)
            }
        })
    }
}

pub(super) async fn get_filter(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<FilterData>> {
    let selection = state.session.selection().await;
    ApiResponse::new(
        FilterData {
            generation: selection.generation,
            filter: selection.filter,
        },
        req_id.0,
    )
}

/// Replaces the session filter wholesale.
///
/// Any request still running against the previous filter will see its
/// result discarded.
pub(super) async fn replace_filter(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<FilterRequest>,
) -> Result<Json<ApiResponse<FilterData>>, ApiError> {
    let filter = body
        .into_filter()
        .map_err(|msg| ApiError::new(req_id.0.clone(), "validation_error", msg))?;

    let selection = state.session.replace_filter(filter).await;
    Ok(ApiResponse::new(
        FilterData {
            generation: selection.generation,
            filter: selection.filter,
        },
        req_id.0,
    ))
}
