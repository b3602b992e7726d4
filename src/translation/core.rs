/*!
 * Core translation service implementation.
 *
 * This module contains the main TranslationService struct, which owns the
 * configured provider client and turns a system prompt plus a user message
 * into the model's reply text.
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::debug;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::ProviderError;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Provider;

/// A single-shot chat completion: instructions in, reply text out
///
/// This is the seam the batch translator talks to. Implementations make one
/// call per invocation and never retry.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one system prompt and one user message, return the reply text
    async fn complete_chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError>;
}

/// Token usage statistics for tracking API consumption
#[derive(Clone, Debug)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Number of completed API calls
    pub requests: u64,

    /// Total time spent on API requests
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,
}

impl TokenUsageStats {
    /// Create new token usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            requests: 0,
            api_duration: Duration::from_secs(0),
            provider,
            model,
        }
    }

    /// Record one completed request
    pub fn record(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>, duration: Duration) {
        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }

        self.requests += 1;
        self.api_duration += duration;
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        format!(
            "Token Usage Summary:\n\
             Provider: {}\n\
             Model: {}\n\
             Requests: {}\n\
             Prompt tokens: {}\n\
             Completion tokens: {}\n\
             Total tokens: {}\n\
             API request time: {:.2} minutes",
            self.provider,
            self.model,
            self.requests,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            self.api_duration.as_secs_f64() / 60.0,
        )
    }
}

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// OpenAI API service
    OpenAI {
        /// Client instance
        client: OpenAI,
    },

    /// LM Studio local server (OpenAI-compatible)
    LMStudio {
        /// Client instance (OpenAI-compatible)
        client: OpenAI,
    },

    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
    },
}

/// Translation service backed by the configured provider
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    usage: Mutex<TokenUsageStats>,
}

impl TranslationService {
    /// Create a new translation service with the given configuration and credential
    pub fn new(config: TranslationConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let endpoint = config.get_endpoint();
        let timeout_secs = config.get_timeout_secs();

        if endpoint.trim().is_empty() {
            return Err(anyhow!("Endpoint cannot be empty"));
        }

        let provider = match config.provider {
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new(api_key, endpoint, timeout_secs),
            },
            ConfigTranslationProvider::LMStudio => TranslationProviderImpl::LMStudio {
                client: OpenAI::new(api_key, endpoint, timeout_secs),
            },
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new(api_key, endpoint, timeout_secs),
            },
        };

        let usage = TokenUsageStats::with_provider_info(
            config.provider.display_name().to_string(),
            config.get_model(),
        );

        Ok(Self {
            provider,
            config,
            usage: Mutex::new(usage),
        })
    }

    /// Snapshot of the token usage so far
    pub fn token_usage(&self) -> Option<TokenUsageStats> {
        self.usage.lock().ok().map(|stats| stats.clone())
    }

    fn record_usage(&self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>, duration: Duration) {
        if let Ok(mut stats) = self.usage.lock() {
            stats.record(prompt_tokens, completion_tokens, duration);
        }
    }
}

#[async_trait]
impl CompletionBackend for TranslationService {
    async fn complete_chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let start_time = Instant::now();
        let model = self.config.get_model();
        let temperature = self.config.common.temperature;
        let max_tokens = self.config.get_max_tokens();

        let (text, prompt_tokens, completion_tokens) = match &self.provider {
            TranslationProviderImpl::OpenAI { client } | TranslationProviderImpl::LMStudio { client } => {
                let request = OpenAIRequest::new(model)
                    .add_message("system", system_prompt)
                    .add_message("user", user_prompt)
                    .temperature(temperature)
                    .max_tokens(max_tokens);

                let response = client.complete(request).await?;
                if let Some(reason) = response.choices.first().and_then(|c| c.finish_reason.as_deref()) {
                    if reason == "length" {
                        debug!("Reply hit the max_tokens budget ({}) and may be cut short", max_tokens);
                    }
                }

                let usage = response.usage.as_ref()
                    .map(|u| (Some(u.prompt_tokens as u64), Some(u.completion_tokens as u64)))
                    .unwrap_or((None, None));
                (OpenAI::extract_text(&response), usage.0, usage.1)
            },
            TranslationProviderImpl::Anthropic { client } => {
                let request = AnthropicRequest::new(model, max_tokens)
                    .system(system_prompt)
                    .add_message("user", user_prompt)
                    .temperature(temperature);

                let response = client.complete(request).await?;
                (
                    Anthropic::extract_text(&response),
                    Some(response.usage.input_tokens as u64),
                    Some(response.usage.output_tokens as u64),
                )
            },
        };

        let duration = start_time.elapsed();
        self.record_usage(prompt_tokens, completion_tokens, duration);
        debug!("{} response received in {:?}", self.config.provider.display_name(), duration);

        if text.trim().is_empty() {
            return Err(ProviderError::ParseError("Provider returned an empty reply".to_string()));
        }

        Ok(text)
    }
}
