//! Google Business Profile access for the dashboard.
//!
//! An HTTP client for accounts, locations, daily metrics and reviews, the
//! boundary normalization into domain records, and the [`DataProvider`]
//! that hides whether data comes from a snapshot file or the live APIs.

pub mod client;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod types;

pub use client::{GbpBaseUrls, GbpClient, MAX_PAGES};
pub use error::GbpError;
pub use normalize::{normalize_location, normalize_metrics, normalize_review, normalize_reviews};
pub use provider::{DataProvider, RemoteProvider, StaticProvider};
pub use types::{Account, GbpLocation, GbpReview};
