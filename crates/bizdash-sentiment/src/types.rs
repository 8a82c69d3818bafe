//! Classifier results and the Gemini wire shapes.

use bizdash_core::engine::SentimentAssignment;
use serde::{Deserialize, Serialize};

/// Summary text used for every category when there is nothing to classify.
pub const NO_REVIEWS_SUMMARY: &str = "No reviews to analyze.";

/// One summary per sentiment category, across all classified reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSummaries {
    pub positive: String,
    pub neutral: String,
    pub negative: String,
}

/// Per-review verdicts plus the category summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub sentiments: Vec<SentimentAssignment>,
    pub summaries: SentimentSummaries,
}

impl SentimentAnalysis {
    /// The fixed answer for an empty review list.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            sentiments: Vec::new(),
            summaries: SentimentSummaries {
                positive: NO_REVIEWS_SUMMARY.to_string(),
                neutral: NO_REVIEWS_SUMMARY.to_string(),
                negative: NO_REVIEWS_SUMMARY.to_string(),
            },
        }
    }
}

// --- request ---

#[derive(Debug, Serialize)]
pub(crate) struct ReviewInput<'a> {
    pub id: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_mime_type: &'static str,
    pub response_schema: serde_json::Value,
}

// --- response ---

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

/// The model's JSON answer, before labels are mapped.
#[derive(Debug, Deserialize)]
pub(crate) struct RawAnalysis {
    #[serde(default)]
    pub sentiments: Vec<RawSentiment>,
    pub summaries: SentimentSummaries,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSentiment {
    pub id: String,
    pub sentiment: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}
