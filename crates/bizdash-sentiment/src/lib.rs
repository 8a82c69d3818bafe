//! Review sentiment classification for the dashboard.
//!
//! Sends `(id, text)` pairs to a Gemini model with a JSON response schema
//! and maps the returned labels onto [`bizdash_core::Sentiment`]. The
//! verdicts are merged into reviews by
//! [`bizdash_core::engine::apply_sentiments`]; this crate never touches
//! review records itself.

pub mod classifier;
pub mod error;
pub mod types;

pub use classifier::{GeminiClassifier, DEFAULT_MODEL};
pub use error::SentimentError;
pub use types::{SentimentAnalysis, SentimentSummaries, NO_REVIEWS_SUMMARY};
