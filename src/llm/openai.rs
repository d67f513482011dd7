use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::json;

use crate::config::LLMConfig;
use crate::llm::client::{LLMClient, LLMResponse, TokenUsage};

/// OpenAI API response for chat completions
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
    #[serde(default)]
    total_tokens: usize,
}

/// A client for the OpenAI API
pub struct OpenAIClient {
    client: Client,
    config: LLMConfig,
}

impl OpenAIClient {
    /// Create a new OpenAI client
    pub fn new(config: &LLMConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key);
        let auth_header = header::HeaderValue::from_str(&auth_value)
            .context("Failed to create Authorization header")?;
        headers.insert(header::AUTHORIZATION, auth_header);

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
            m if m.contains("gpt-4o") => (0.0025, 0.01),
            m if m.contains("gpt-4-turbo") => (0.01, 0.03),
            m if m.contains("gpt-4") => (0.03, 0.06),
            m if m.contains("gpt-3.5") => (0.0005, 0.0015),
            _ => {
                debug!(
                    "Unknown model pricing for {}, using gpt-4o pricing",
                    self.config.model
                );
                (0.0025, 0.01)
            }
        }
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
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
            .unwrap_or("https://api.openai.com");
        let url = format!("{}/v1/chat/completions", base_url);

        let request_body = json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "system",
                    "content": system
                },
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
            .context("Failed to send request to OpenAI API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .context("Failed to read error response from OpenAI API")?;
            debug!("OpenAI API error: {}", error_text);
            return Err(anyhow::anyhow!(
                "OpenAI API error ({}): {}",
                status,
                error_text
            ));
        }

        let response_data: OpenAIResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI API response")?;

        let content = response_data
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("OpenAI API returned no content"))?;

        let usage = if let Some(api_usage) = response_data.usage {
            TokenUsage {
                prompt_tokens: api_usage.prompt_tokens,
                completion_tokens: api_usage.completion_tokens,
                total_tokens: api_usage.total_tokens,
            }
        } else {
            debug!("No usage information returned from OpenAI API");
            TokenUsage::default()
        };

        Ok(LLMResponse { content, usage })
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn get_token_prices(&self) -> (f64, f64) {
        self.get_model_pricing()
    }
}
