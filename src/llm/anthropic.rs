use crate::config::LlmConfig;
use crate::llm::client::{LLMClient, LLMError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

/// Messages API client.
///
/// One request per call, no retry loop: the failure causes that matter here
/// (bad key, rate limit, malformed prompt) are not transient. The API key
/// lives only in this struct and the request header; it is never logged and
/// never appears in an error message.
pub struct AnthropicClient {
    api_key: String,
    model: String,
    http_client: Client,
}

impl AnthropicClient {
    /// Build a client from config, resolving the API key from the
    /// environment first and the config file second.
    pub fn from_config(config: &crate::config::Config) -> Result<Self, LLMError> {
        let api_key = config.get_api_key().ok_or(LLMError::NotConfigured)?;
        Ok(Self::new(api_key, &config.llm))
    }

    pub fn new(api_key: String, llm: &LlmConfig) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(llm.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            model: llm.model.clone(),
            http_client,
        }
    }

    async fn call_api(&self, system: &str, prompt: &str) -> Result<String, LLMError> {
        let request_body = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: system.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .http_client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else {
                    LLMError::NetworkError(e)
                }
            })?;

        let status = response.status();

        if status.as_u16() == 401 {
            return Err(LLMError::InvalidApiKey);
        }
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(LLMError::RateLimited(retry_after));
        }
        if !status.is_success() {
            // Body is truncated: enough to diagnose, not enough to flood
            // the caller's error surface.
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(LLMError::ApiError(format!("HTTP {status}: {snippet}")));
        }

        let body = response.text().await?;
        let api_response: AnthropicResponse = serde_json::from_str(&body)?;

        match api_response.content.first() {
            Some(block) => Ok(block.text.trim().to_string()),
            None => Err(LLMError::InvalidResponse(
                "no content in response".to_string(),
            )),
        }
    }
}

#[async_trait]
impl LLMClient for AnthropicClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LLMError> {
        self.call_api(system, prompt).await
    }
}
