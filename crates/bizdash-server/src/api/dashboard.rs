//! Dashboard, sentiment analysis and export for the session filter.
//!
//! Each handler snapshots the session selection before it fetches and
//! checks the generation again once the data is in, so a filter change
//! mid-flight yields `stale_selection` rather than mismatched numbers.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use bizdash_core::engine::apply_sentiments;
use bizdash_core::{build_dashboard, write_workbook, DashboardView, ExportError};
use bizdash_sentiment::{SentimentAnalysis, SentimentSummaries};
use serde::Serialize;

use crate::middleware::RequestId;
use crate::session::Selection;

use super::{
    map_classifier_error, map_provider_error, stale_error, ApiError, ApiResponse, AppState,
};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Serialize)]
pub(super) struct DashboardData {
    pub generation: u64,
    #[serde(flatten)]
    pub view: DashboardView,
    /// Present once reviews of this selection were analysed.
    pub sentiment_summaries: Option<SentimentSummaries>,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeData {
    pub generation: u64,
    #[serde(flatten)]
    pub analysis: SentimentAnalysis,
}

/// Loads data for the current selection and assembles the dashboard with
/// any stored sentiment labels merged in.
async fn current_view(
    state: &AppState,
    request_id: &str,
) -> Result<(Selection, DashboardView, Option<SentimentAnalysis>), ApiError> {
    let selection = state.session.selection().await;
    let mut data = state
        .provider
        .load(&selection.filter)
        .await
        .map_err(|e| map_provider_error(request_id.to_string(), &e))?;

    let analysis = state
        .session
        .analysis(selection.generation)
        .await
        .map_err(|stale| stale_error(request_id.to_string(), stale))?;
    if let Some(analysis) = &analysis {
        data.reviews = apply_sentiments(&data.reviews, &analysis.sentiments);
    }

    let view = build_dashboard(&selection.filter, &data);
    Ok((selection, view, analysis))
}

pub(super) async fn get_dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DashboardData>>, ApiError> {
    let (selection, view, analysis) = current_view(&state, &req_id.0).await?;
    Ok(ApiResponse::new(
        DashboardData {
            generation: selection.generation,
            view,
            sentiment_summaries: analysis.map(|a| a.summaries),
        },
        req_id.0,
    ))
}

/// Classifies the reviews of the current period and stores the labels
/// for the selection they were computed under.
pub(super) async fn analyze_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<AnalyzeData>>, ApiError> {
    let Some(classifier) = state.classifier.clone() else {
        return Err(ApiError::new(
            req_id.0,
            "classifier_unavailable",
            "sentiment analysis is not configured (GEMINI_API_KEY unset)",
        ));
    };

    let (selection, view, _) = current_view(&state, &req_id.0).await?;
    let analysis = classifier
        .classify(&view.reviews)
        .await
        .map_err(|e| map_classifier_error(req_id.0.clone(), &e))?;

    state
        .session
        .store_analysis(selection.generation, analysis.clone())
        .await
        .map_err(|stale| stale_error(req_id.0.clone(), stale))?;

    Ok(ApiResponse::new(
        AnalyzeData {
            generation: selection.generation,
            analysis,
        },
        req_id.0,
    ))
}

/// Workbook with the chart series and the period reviews.
pub(super) async fn export_workbook(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, ApiError> {
    let (selection, view, _) = current_view(&state, &req_id.0).await?;
    let comparing = selection.filter.comparison.is_some();

    let bytes = write_workbook(&view.series, &view.reviews, comparing).map_err(|e| match e {
        ExportError::NoData => ApiError::new(req_id.0.clone(), "not_found", e.to_string()),
        ExportError::Xlsx(_) => {
            tracing::error!(error = %e, "workbook export failed");
            ApiError::new(req_id.0.clone(), "internal_error", "workbook export failed")
        }
    })?;

    let range = selection.filter.range;
    let disposition = format!(
        "attachment; filename=\"bizdash-{}-{}.xlsx\"",
        range.from(),
        range.to()
    );
    tracing::info!(bytes = bytes.len(), %range, "workbook exported");

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
