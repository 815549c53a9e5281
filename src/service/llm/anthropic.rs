//! Integration with the Anthropic Messages API.
//!
//! This module provides a thin wrapper around the `/v1/messages` endpoint for
//! turning a single user prompt into a reply. Only what the bot needs from the
//! wire format is modeled: the request's model, token cap, and user message,
//! and the response's typed content blocks.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{ContentBlock, Res},
};

use super::{GenericLlmClient, LlmClient, extract_reply};

// Constants.

/// Base URL of the hosted API.
pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
/// API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Model used for every completion.
pub const ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20240620";
/// Maximum output tokens per completion.
pub const ANTHROPIC_MAX_TOKENS: u32 = 1000;

// Extra methods on `LlmClient` applied by the anthropic implementation.

impl LlmClient {
    pub fn anthropic(config: &Config) -> Self {
        let client = AnthropicLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Wire types.

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

// Specific implementations.

/// Anthropic LLM client implementation.
#[derive(Clone)]
pub struct AnthropicLlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicLlmClient {
    /// Create a new Anthropic LLM client against the hosted API.
    #[instrument(name = "AnthropicLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(config, ANTHROPIC_API_BASE)
    }

    /// Create a new Anthropic LLM client against a different host.
    pub fn with_base_url(config: &Config, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: config.anthropic_api_key.clone(),
            base_url: base_url.into(),
        }
    }

    /// Sends the request and decodes the content blocks of the response.
    async fn create_message(&self, prompt: &str) -> Res<Vec<ContentBlock>> {
        let request = MessagesRequest {
            model: ANTHROPIC_MODEL,
            max_tokens: ANTHROPIC_MAX_TOKENS,
            messages: vec![ApiMessage { role: "user", content: prompt }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .context("Anthropic request failed")?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Anthropic API error {status}: {body}"));
        }

        let response: MessagesResponse = response.json().await.context("Failed to decode Anthropic response")?;

        Ok(response.content)
    }
}

#[async_trait]
impl GenericLlmClient for AnthropicLlmClient {
    #[instrument(name = "AnthropicLlmClient::complete", skip_all)]
    async fn complete(&self, prompt: &str) -> Res<String> {
        let blocks = self.create_message(prompt).await?;
        let reply = extract_reply(&blocks);

        info!("Claude reply:\n{}", reply);

        Ok(reply)
    }
}

// Tests.
