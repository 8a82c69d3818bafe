//! HTTP client for the Google Business Profile APIs.
//!
//! The data lives behind four services (account management, business
//! information, performance, and the v4 reviews API). Every request carries
//! the opaque bearer credential; non-2xx responses surface as
//! [`GbpError::ApiError`] with the upstream message when one is present.
//! There is no retry: a failure is reported once and the caller decides.

use std::time::Duration;

use bizdash_core::DateRange;
use chrono::Datelike;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::GbpError;
use crate::normalize::DAILY_METRICS;
use crate::types::{
    Account, ErrorEnvelope, FetchMultiDailyMetricsResponse, GbpLocation, GbpReview,
    ListAccountsResponse, ListLocationsResponse, ListReviewsResponse,
};

const ACCOUNTS_BASE_URL: &str = "https://mybusinessaccountmanagement.googleapis.com/v1/";
const LOCATIONS_BASE_URL: &str = "https://mybusinessbusinessinformation.googleapis.com/v1/";
const PERFORMANCE_BASE_URL: &str = "https://businessprofileperformance.googleapis.com/v1/";
const REVIEWS_BASE_URL: &str = "https://mybusiness.googleapis.com/v4/";

/// Upper bound on pages followed for any one listing.
pub const MAX_PAGES: usize = 50;

const LOCATION_READ_MASK: &str = "name,title,storefrontAddress";
const LOCATION_PAGE_SIZE: &str = "100";
const REVIEW_PAGE_SIZE: &str = "50";

/// Base URLs of the four services.
#[derive(Debug, Clone)]
pub struct GbpBaseUrls {
    pub accounts: String,
    pub locations: String,
    pub performance: String,
    pub reviews: String,
}

impl Default for GbpBaseUrls {
    fn default() -> Self {
        Self {
            accounts: ACCOUNTS_BASE_URL.to_string(),
            locations: LOCATIONS_BASE_URL.to_string(),
            performance: PERFORMANCE_BASE_URL.to_string(),
            reviews: REVIEWS_BASE_URL.to_string(),
        }
    }
}

impl GbpBaseUrls {
    /// Points every service at the same host, e.g. one mock server.
    #[must_use]
    pub fn single(base_url: &str) -> Self {
        Self {
            accounts: base_url.to_string(),
            locations: base_url.to_string(),
            performance: base_url.to_string(),
            reviews: base_url.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Endpoints {
    accounts: Url,
    locations: Url,
    performance: Url,
    reviews: Url,
}

/// Client for the Business Profile APIs.
///
/// Use [`GbpClient::new`] for production or [`GbpClient::with_base_urls`]
/// to point at a mock server in tests.
#[derive(Clone)]
pub struct GbpClient {
    client: Client,
    access_token: String,
    endpoints: Endpoints,
}

impl std::fmt::Debug for GbpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GbpClient")
            .field("access_token", &"[redacted]")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl GbpClient {
    /// Creates a client pointed at the production APIs.
    ///
    /// # Errors
    ///
    /// Returns [`GbpError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(access_token: &str, timeout_secs: u64) -> Result<Self, GbpError> {
        Self::with_base_urls(access_token, timeout_secs, GbpBaseUrls::default())
    }

    /// Creates a client with custom service URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GbpError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GbpError::ApiError`] if a base URL does not parse.
    pub fn with_base_urls(
        access_token: &str,
        timeout_secs: u64,
        urls: GbpBaseUrls,
    ) -> Result<Self, GbpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("bizdash/0.1 (business-analytics)")
            .build()?;

        let endpoints = Endpoints {
            accounts: parse_base(&urls.accounts)?,
            locations: parse_base(&urls.locations)?,
            performance: parse_base(&urls.performance)?,
            reviews: parse_base(&urls.reviews)?,
        };

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            endpoints,
        })
    }

    /// Lists every account visible to the credential.
    ///
    /// # Errors
    ///
    /// - [`GbpError::ApiError`] on a non-2xx response.
    /// - [`GbpError::Http`] on network failure.
    /// - [`GbpError::Deserialize`] if a page does not match the expected shape.
    /// - [`GbpError::PaginationLimit`] past [`MAX_PAGES`] pages.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, GbpError> {
        let mut accounts = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut url = join(&self.endpoints.accounts, "accounts")?;
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let page: ListAccountsResponse = self.get_json(url, "accounts.list").await?;
            accounts.extend(page.accounts);

            match next_token(page.next_page_token) {
                Some(token) => page_token = Some(token),
                None => return Ok(accounts),
            }
        }

        Err(GbpError::PaginationLimit {
            resource: "accounts".to_string(),
            max_pages: MAX_PAGES,
        })
    }

    /// Lists the locations of `account` (`accounts/{id}`).
    ///
    /// # Errors
    ///
    /// Same as [`Self::list_accounts`].
    pub async fn list_locations(&self, account: &str) -> Result<Vec<GbpLocation>, GbpError> {
        let mut locations = Vec::new();
        let mut page_token: Option<String> = None;
        let context = format!("{account}/locations");

        for _ in 0..MAX_PAGES {
            let mut url = join(&self.endpoints.locations, &context)?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("readMask", LOCATION_READ_MASK);
                pairs.append_pair("pageSize", LOCATION_PAGE_SIZE);
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            let page: ListLocationsResponse = self.get_json(url, &context).await?;
            locations.extend(page.locations);

            match next_token(page.next_page_token) {
                Some(token) => page_token = Some(token),
                None => return Ok(locations),
            }
        }

        Err(GbpError::PaginationLimit {
            resource: context,
            max_pages: MAX_PAGES,
        })
    }

    /// Fetches the daily metric time series of `location` (`locations/{id}`)
    /// over `range`, both ends inclusive.
    ///
    /// # Errors
    ///
    /// - [`GbpError::ApiError`] on a non-2xx response.
    /// - [`GbpError::Http`] on network failure.
    /// - [`GbpError::Deserialize`] if the body does not match the expected shape.
    pub async fn fetch_daily_metrics(
        &self,
        location: &str,
        range: &DateRange,
    ) -> Result<FetchMultiDailyMetricsResponse, GbpError> {
        let url = self.daily_metrics_url(location, range)?;
        let context = format!("{location}:fetchMultiDailyMetricsTimeSeries");
        tracing::debug!(location, %range, "fetching daily metrics");
        self.get_json(url, &context).await
    }

    /// Fetches every review of `location` under `account`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::list_accounts`].
    pub async fn fetch_reviews(
        &self,
        account: &str,
        location: &str,
    ) -> Result<Vec<GbpReview>, GbpError> {
        let mut reviews = Vec::new();
        let mut page_token: Option<String> = None;
        let context = format!("{account}/{location}/reviews");

        for _ in 0..MAX_PAGES {
            let mut url = join(&self.endpoints.reviews, &context)?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("pageSize", REVIEW_PAGE_SIZE);
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            let page: ListReviewsResponse = self.get_json(url, &context).await?;
            reviews.extend(page.reviews);

            match next_token(page.next_page_token) {
                Some(token) => page_token = Some(token),
                None => return Ok(reviews),
            }
        }

        Err(GbpError::PaginationLimit {
            resource: context,
            max_pages: MAX_PAGES,
        })
    }

    fn daily_metrics_url(&self, location: &str, range: &DateRange) -> Result<Url, GbpError> {
        let mut url = join(
            &self.endpoints.performance,
            &format!("{location}:fetchMultiDailyMetricsTimeSeries"),
        )?;
        {
            let mut pairs = url.query_pairs_mut();
            for metric in DAILY_METRICS {
                pairs.append_pair("dailyMetrics", metric);
            }
            let (from, to) = (range.from(), range.to());
            pairs.append_pair("dailyRange.startDate.year", &from.year().to_string());
            pairs.append_pair("dailyRange.startDate.month", &from.month().to_string());
            pairs.append_pair("dailyRange.startDate.day", &from.day().to_string());
            pairs.append_pair("dailyRange.endDate.year", &to.year().to_string());
            pairs.append_pair("dailyRange.endDate.month", &to.month().to_string());
            pairs.append_pair("dailyRange.endDate.day", &to.day().to_string());
        }
        Ok(url)
    }

    /// Sends an authenticated GET and parses a 2xx body as `T`.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<T, GbpError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = api_error_message(status, &body);
            tracing::debug!(context, %status, "Business Profile request failed");
            return Err(GbpError::ApiError(message));
        }

        serde_json::from_str(&body).map_err(|e| GbpError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

/// Normalises a base URL to end with exactly one slash so relative joins
/// append to its path instead of replacing the last segment.
fn parse_base(raw: &str) -> Result<Url, GbpError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised)
        .map_err(|e| GbpError::ApiError(format!("invalid base URL '{raw}': {e}")))
}

fn join(base: &Url, path: &str) -> Result<Url, GbpError> {
    base.join(path)
        .map_err(|e| GbpError::ApiError(format!("invalid resource path '{path}': {e}")))
}

fn next_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

/// Prefers the upstream `error.message`; falls back to the bare status.
fn api_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            format!("{status}: {}", envelope.error.message)
        }
        _ => status.to_string(),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
