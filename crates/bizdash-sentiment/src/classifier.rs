//! Gemini `generateContent` client used as the review classifier.
//!
//! One request per batch, no retry. The model is constrained to a JSON
//! response schema so the answer parses straight into [`RawAnalysis`].

use std::time::Duration;

use bizdash_core::engine::SentimentAssignment;
use bizdash_core::{ReviewRecord, Sentiment};
use reqwest::{Client, StatusCode};

use crate::error::SentimentError;
use crate::types::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part, RawAnalysis, ReviewInput, SentimentAnalysis,
};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const PROMPT_PREAMBLE: &str = "\
You are an expert business review analyst.
Your task is to perform sentiment analysis on a list of customer reviews.

For each review, classify the sentiment as 'Positive', 'Neutral', or 'Negative'.

After analyzing all reviews, provide three summaries:
1. A summary of the common themes in the positive reviews.
2. A summary of the common themes in the neutral reviews.
3. A summary of the common themes and actionable feedback from the negative reviews.

Here is the list of reviews to analyze:
";

#[derive(Clone)]
pub struct GeminiClassifier {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClassifier")
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClassifier {
    /// Creates a classifier pointed at the production Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, SentimentError> {
        Self::with_base_url(api_key, model, timeout_secs, GEMINI_BASE_URL)
    }

    /// Creates a classifier with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SentimentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("bizdash/0.1 (business-analytics)")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Classifies every review and summarises each sentiment category.
    ///
    /// An empty slice returns [`SentimentAnalysis::empty`] without a request.
    ///
    /// # Errors
    ///
    /// - [`SentimentError::ApiError`] on a non-2xx response.
    /// - [`SentimentError::Http`] on network failure.
    /// - [`SentimentError::EmptyResponse`] when no candidate text comes back.
    /// - [`SentimentError::Deserialize`] if the envelope or the model's JSON
    ///   does not match the schema.
    pub async fn classify(
        &self,
        reviews: &[ReviewRecord],
    ) -> Result<SentimentAnalysis, SentimentError> {
        if reviews.is_empty() {
            return Ok(SentimentAnalysis::empty());
        }

        let request = build_request(reviews)?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        tracing::debug!(model = %self.model, reviews = reviews.len(), "classifying reviews");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(%status, "Gemini request failed");
            return Err(SentimentError::ApiError(api_error_message(status, &body)));
        }

        let envelope: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| SentimentError::Deserialize {
                context: "generateContent".to_string(),
                source: e,
            })?;
        let text = candidate_text(envelope).ok_or(SentimentError::EmptyResponse)?;
        let analysis = parse_analysis(&text)?;

        tracing::info!(
            model = %self.model,
            requested = reviews.len(),
            classified = analysis.sentiments.len(),
            "review sentiment analysed"
        );
        Ok(analysis)
    }
}

fn build_request(reviews: &[ReviewRecord]) -> Result<GenerateContentRequest, SentimentError> {
    let inputs: Vec<ReviewInput<'_>> = reviews
        .iter()
        .map(|r| ReviewInput {
            id: &r.id,
            text: &r.text,
        })
        .collect();
    let listing = serde_json::to_string(&inputs).map_err(|e| SentimentError::Deserialize {
        context: "review listing".to_string(),
        source: e,
    })?;

    Ok(GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(format!("{PROMPT_PREAMBLE}{listing}")),
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: response_schema(),
        },
    })
}

fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "sentiments": {
                "type": "ARRAY",
                "description": "An array of sentiment analysis for each provided review.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": {
                            "type": "STRING",
                            "description": "The unique ID of the review that was analyzed."
                        },
                        "sentiment": {
                            "type": "STRING",
                            "description": "The classified sentiment. Must be one of: Positive, Neutral, Negative."
                        }
                    },
                    "required": ["id", "sentiment"]
                }
            },
            "summaries": {
                "type": "OBJECT",
                "description": "Summaries for each sentiment category based on all provided reviews.",
                "properties": {
                    "positive": {
                        "type": "STRING",
                        "description": "A concise summary of the key points from positive reviews."
                    },
                    "neutral": {
                        "type": "STRING",
                        "description": "A concise summary of the key points from neutral reviews."
                    },
                    "negative": {
                        "type": "STRING",
                        "description": "A concise summary of the key points and common complaints from negative reviews."
                    }
                },
                "required": ["positive", "neutral", "negative"]
            }
        },
        "required": ["sentiments", "summaries"]
    })
}

/// Concatenated text parts of the first candidate, if any.
fn candidate_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    (!text.trim().is_empty()).then_some(text)
}

fn parse_analysis(text: &str) -> Result<SentimentAnalysis, SentimentError> {
    let raw: RawAnalysis =
        serde_json::from_str(text).map_err(|e| SentimentError::Deserialize {
            context: "model output".to_string(),
            source: e,
        })?;

    let sentiments = raw
        .sentiments
        .into_iter()
        .map(|s| {
            let sentiment = Sentiment::from_label(&s.sentiment);
            if sentiment == Sentiment::Unanalyzed {
                tracing::warn!(id = %s.id, label = %s.sentiment, "unrecognised sentiment label");
            }
            SentimentAssignment { id: s.id, sentiment }
        })
        .collect();

    Ok(SentimentAnalysis {
        sentiments,
        summaries: raw.summaries,
    })
}

fn api_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            format!("{status}: {}", envelope.error.message)
        }
        _ => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_analysis_maps_labels_case_insensitively() {
        let text = r#"{
            "sentiments": [
                {"id": "r1", "sentiment": "POSITIVE"},
                {"id": "r2", "sentiment": "negative"},
                {"id": "r3", "sentiment": "Mixed"}
            ],
            "summaries": {"positive": "p", "neutral": "n", "negative": "x"}
        }"#;
        let analysis = parse_analysis(text).unwrap();
        let labels: Vec<Sentiment> = analysis.sentiments.iter().map(|s| s.sentiment).collect();
        assert_eq!(
            labels,
            vec![Sentiment::Positive, Sentiment::Negative, Sentiment::Unanalyzed]
        );
        assert_eq!(analysis.summaries.neutral, "n");
    }

    #[test]
    fn parse_analysis_rejects_missing_summaries() {
        let err = parse_analysis(r#"{"sentiments": []}"#).unwrap_err();
        assert!(matches!(err, SentimentError::Deserialize { ref context, .. } if context == "model output"));
    }

    #[test]
    fn candidate_text_joins_parts_and_skips_blank() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        }))
        .unwrap();
        assert_eq!(candidate_text(response).as_deref(), Some("{\"a\":1}"));

        let blank: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "  " }] } }]
        }))
        .unwrap();
        assert_eq!(candidate_text(blank), None);

        let none: GenerateContentResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(candidate_text(none), None);
    }

    #[test]
    fn request_embeds_review_listing_and_schema() {
        let review = ReviewRecord {
            id: "r1".to_string(),
            location_id: "locations/1".to_string(),
            author: "Jane".to_string(),
            rating: bizdash_core::StarRating::new(5).unwrap(),
            text: "Lovely \"flat white\"".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            sentiment: Sentiment::Unanalyzed,
        };
        let request = build_request(&[review]).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        let prompt = json["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains(r#"[{"id":"r1","text":"Lovely \"flat white\""}]"#));
        assert!(!prompt.contains("Jane"));
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            json["generationConfig"]["responseSchema"]["required"],
            serde_json::json!(["sentiments", "summaries"])
        );
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let classifier =
            GeminiClassifier::with_base_url("secret-key", DEFAULT_MODEL, 30, "http://x").unwrap();
        assert!(!format!("{classifier:?}").contains("secret-key"));
    }
}
