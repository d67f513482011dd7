use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LLMConfig;
use crate::llm::anthropic::AnthropicClient;
use crate::llm::openai::OpenAIClient;

/// Token usage reported by a provider, propagated unmodified.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

impl fmt::Display for TokenUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} prompt + {} completion = {} tokens",
            self.prompt_tokens, self.completion_tokens, self.total_tokens
        )
    }
}

/// Cost of a batch of calls, in USD.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCost {
    pub prompt_cost: f64,
    pub completion_cost: f64,
    pub total_cost: f64,
}

impl fmt::Display for TokenCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.4}", self.total_cost)
    }
}

/// A completion returned by a provider.
#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub usage: TokenUsage,
}

/// A client for a fix-generation service.
///
/// One exchange: a system instruction plus a user payload in, free text
/// out. Transport-level concerns (timeout, status handling) live behind
/// this trait; the orchestrator never retries at this level.
#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn completion(
        &self,
        system: &str,
        user: &str,
        max_tokens: usize,
        temperature: f64,
    ) -> Result<LLMResponse>;

    /// Name of the client, for logging
    fn name(&self) -> &str;

    /// (prompt, completion) price per 1K tokens for the configured model
    fn get_token_prices(&self) -> (f64, f64);

    fn calculate_cost(&self, usage: &TokenUsage) -> TokenCost {
        let (prompt_price, completion_price) = self.get_token_prices();
        let prompt_cost = usage.prompt_tokens as f64 / 1000.0 * prompt_price;
        let completion_cost = usage.completion_tokens as f64 / 1000.0 * completion_price;
        TokenCost {
            prompt_cost,
            completion_cost,
            total_cost: prompt_cost + completion_cost,
        }
    }
}

/// Create an LLM client from a configuration
pub fn create_client(config: &LLMConfig) -> Result<Box<dyn LLMClient>> {
    match config.model_type.as_str() {
        "openai" => {
            let client = OpenAIClient::new(config)?;
            Ok(Box::new(client))
        }
        "anthropic" => {
            let client = AnthropicClient::new(config)?;
            Ok(Box::new(client))
        }
        _ => Err(anyhow::anyhow!(
            "Unsupported LLM type: {}",
            config.model_type
        )),
    }
}
