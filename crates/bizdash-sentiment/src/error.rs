use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The model endpoint answered with a non-2xx status.
    #[error("Gemini API error: {0}")]
    ApiError(String),

    /// A 2xx response that carried no candidate text.
    #[error("Gemini returned no content")]
    EmptyResponse,

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
