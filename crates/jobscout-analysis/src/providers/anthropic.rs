//! Anthropic Claude analysis provider.

use crate::client::{Analysis, AnalysisClient};
use crate::error::{AnalysisError, Result};
use crate::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::providers::common::{build_http_client, request_error, retry_after};
use crate::response::parse_response;
use async_trait::async_trait;
use jobscout_core::{AnalysisConfig, Listing, Profile};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "anthropic";

/// Anthropic overload status, outside the standard set.
const STATUS_OVERLOADED: u16 = 529;

/// Scores listings with the Anthropic Messages API.
pub struct AnthropicAnalyzer {
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    client: Client,
    base_url: String,
}

impl AnthropicAnalyzer {
    /// Create an analyzer using the model and limits from configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>, config: &AnalysisConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AnalysisError::AuthFailure {
                provider: PROVIDER.to_string(),
                message: "API key is empty".to_string(),
            });
        }

        Ok(Self {
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client: build_http_client(Some(config.timeout_secs))?,
            base_url: "https://api.anthropic.com/v1".to_string(),
        })
    }

    /// Point the analyzer at a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Model used for requests.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_api_request(&self, profile: &Profile, listing: &Listing) -> AnthropicRequest {
        AnthropicRequest {
            model: self.model.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: build_prompt(profile, listing),
            }],
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            system: Some(SYSTEM_PROMPT.to_string()),
        }
    }
}

#[async_trait]
impl AnalysisClient for AnthropicAnalyzer {
    async fn analyze(&self, profile: &Profile, listing: &Listing) -> Result<Analysis> {
        let api_request = self.to_api_request(profile, listing);

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| request_error(PROVIDER, &e))?;

        let status = response.status();
        if !status.is_success() {
            let wait = retry_after(response.headers());
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, wait, error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| request_error(PROVIDER, &e))?;
        let api_response: AnthropicResponse = serde_json::from_str(&body)
            .map_err(|e| AnalysisError::malformed(PROVIDER, format!("Failed to parse response: {e}")))?;

        let text = api_response.text();
        tracing::debug!("Reply for {}: {}", listing.id, text);
        parse_response(PROVIDER, &text)
    }

    fn provider_id(&self) -> &str {
        PROVIDER
    }
}

fn status_error(status: StatusCode, retry_after: Option<Duration>, message: String) -> AnalysisError {
    match status.as_u16() {
        401 | 403 => AnalysisError::AuthFailure {
            provider: PROVIDER.to_string(),
            message,
        },
        429 => AnalysisError::RateLimited {
            provider: PROVIDER.to_string(),
            retry_after,
        },
        408 | STATUS_OVERLOADED => AnalysisError::Transient {
            provider: PROVIDER.to_string(),
            message,
        },
        code if status.is_server_error() => AnalysisError::Transient {
            provider: PROVIDER.to_string(),
            message: format!("status {code}: {message}"),
        },
        code => AnalysisError::InvalidRequest(format!("status {code}: {message}")),
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

impl AnthropicResponse {
    fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}
