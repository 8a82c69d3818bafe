//! Business Profile API response types.
//!
//! Only the fields the dashboard consumes are modelled. Every list is
//! `#[serde(default)]` because the API omits empty arrays entirely.

use serde::Deserialize;

/// Body of an error response: `{ "error": { "code", "message", "status" } }`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Account management
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsResponse {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Resource name, `accounts/{id}`.
    pub name: String,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Business information
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLocationsResponse {
    #[serde(default)]
    pub locations: Vec<GbpLocation>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GbpLocation {
    /// Resource name, `locations/{id}`.
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub storefront_address: Option<PostalAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    #[serde(default)]
    pub address_lines: Vec<String>,
    #[serde(default)]
    pub locality: Option<String>,
}

// ---------------------------------------------------------------------------
// Performance
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchMultiDailyMetricsResponse {
    #[serde(default)]
    pub multi_daily_metric_time_series: Vec<MultiDailyMetricTimeSeries>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiDailyMetricTimeSeries {
    #[serde(default)]
    pub daily_metric_time_series: Vec<DailyMetricTimeSeries>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMetricTimeSeries {
    pub daily_metric: String,
    #[serde(default)]
    pub time_series: TimeSeries,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    #[serde(default)]
    pub dated_values: Vec<DatedValue>,
}

/// One day's value. The API sends counts as decimal strings and omits
/// `value` for days with no activity.
#[derive(Debug, Deserialize)]
pub struct DatedValue {
    pub date: WireDate,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WireDate {
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub month: u32,
    #[serde(default)]
    pub day: u32,
}

// ---------------------------------------------------------------------------
// Reviews (v4)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReviewsResponse {
    #[serde(default)]
    pub reviews: Vec<GbpReview>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub total_review_count: Option<u64>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GbpReview {
    pub review_id: String,
    #[serde(default)]
    pub reviewer: Reviewer,
    /// `ONE` .. `FIVE`, or `STAR_RATING_UNSPECIFIED`.
    #[serde(default)]
    pub star_rating: String,
    #[serde(default)]
    pub comment: String,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub create_time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reviewer {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub is_anonymous: bool,
}
