use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::json;

use crate::config::LLMConfig;
use crate::llm::client::{LLMClient, LLMResponse, TokenUsage};

/// Anthropic API response for the messages endpoint
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: String,
    #[serde(default)]
    r#type: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: usize,
    #[serde(default)]
    output_tokens: usize,
}

/// A client for the Anthropic API
pub struct AnthropicClient {
    client: Client,
    config: LLMConfig,
}

impl AnthropicClient {
    /// Create a new Anthropic client
    pub fn new(config: &LLMConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();

        let api_key_header = header::HeaderValue::from_str(&config.api_key)
            .context("Failed to create x-api-key header")?;
        headers.insert("x-api-key", api_key_header);

        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static("2023-06-01"),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Get token pricing for the configured model
    fn get_model_pricing(&self) -> (f64, f64) {
        match self.config.model.as_str() {
            m if m.contains("opus") => (0.015, 0.075),
            m if m.contains("sonnet") => (0.003, 0.015),
            m if m.contains("haiku") => (0.00025, 0.00125),
            _ => {
                debug!(
                    "Unknown model pricing for {}, using Sonnet pricing",
                    self.config.model
                );
                (0.003, 0.015)
            }
        }
    }
}

#[async_trait]
impl LLMClient for AnthropicClient {
    async fn completion(
        &self,
        system: &str,
        user: &str,
        max_tokens: usize,
        temperature: f64,
    ) -> Result<LLMResponse> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.anthropic.com");
        let url = format!("{}/v1/messages", base_url);

        let request_body = json!({
            "model": self.config.model,
            "system": system,
            "messages": [
                {
                    "role": "user",
                    "content": user
                }
            ],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .context("Failed to read error response from Anthropic API")?;
            debug!("Anthropic API error: {}", error_text);
            return Err(anyhow::anyhow!(
                "Anthropic API error ({}): {}",
                status,
                error_text
            ));
        }

        let response_data: AnthropicResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        if response_data.content.is_empty() {
            return Err(anyhow::anyhow!("Anthropic API returned no content"));
        }

        // Find the text content
        let text_content = response_data
            .content
            .iter()
            .find(|content| content.r#type == "text")
            .map(|content| content.text.clone())
            .unwrap_or_else(|| {
                debug!("No text content found, using first content item");
                response_data
                    .content
                    .first()
                    .map(|c| c.text.clone())
                    .unwrap_or_default()
            });

        let usage = if let Some(api_usage) = response_data.usage {
            TokenUsage {
                prompt_tokens: api_usage.input_tokens,
                completion_tokens: api_usage.output_tokens,
                total_tokens: api_usage.input_tokens + api_usage.output_tokens,
            }
        } else {
            debug!("No usage information returned from Anthropic API");
            TokenUsage::default()
        };

        Ok(LLMResponse {
            content: text_content,
            usage,
        })
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn get_token_prices(&self) -> (f64, f64) {
        self.get_model_pricing()
    }
}
