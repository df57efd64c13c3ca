use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LLMError {
    #[error("no API key configured; set the key in the environment or config file")]
    NotConfigured,

    #[error("API key was rejected")]
    InvalidApiKey,

    #[error("rate limit exceeded, retry after {0}s")]
    RateLimited(u64),

    #[error("request timeout")]
    Timeout,

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    #[error("no staged changes to describe")]
    EmptyDiff,

    #[error("error output cannot be empty")]
    EmptyErrorOutput,

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A single-turn completion client.
///
/// Object safe so the assistant features can be tested against a mock
/// without network access. Implementations perform one request per call
/// and never retry: LLM failures are reported immediately.
#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LLMError>;
}
