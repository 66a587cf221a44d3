// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI adapters for Lectern.
//!
//! [`OpenAiProvider`] implements [`ProviderAdapter`] over chat completions and
//! [`OpenAiEmbedder`] implements [`EmbeddingAdapter`](lectern_core::EmbeddingAdapter)
//! over the embeddings endpoint. Both share one [`OpenAiClient`].

pub mod client;
pub mod embedding;
pub mod types;

use async_trait::async_trait;
use lectern_config::ProviderConfig;
use lectern_core::{
    AdapterType, CompletionRequest, CompletionResponse, HealthStatus, LecternError, PluginAdapter,
    ProviderAdapter, TokenUsage,
};
use tracing::{debug, info};

pub use crate::client::OpenAiClient;
pub use crate::embedding::OpenAiEmbedder;
use crate::types::{ChatMessage, ChatRequest};

/// Environment variable consulted when the config carries no key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAI chat provider implementing [`ProviderAdapter`].
pub struct OpenAiProvider {
    client: OpenAiClient,
}

impl OpenAiProvider {
    /// Creates a provider from the `[providers.openai]` section.
    pub fn new(config: &ProviderConfig) -> Result<Self, LecternError> {
        let client = build_client(config)?;
        info!("OpenAI provider initialized");
        Ok(Self { client })
    }

    pub fn with_client(client: OpenAiClient) -> Self {
        Self { client }
    }
}

/// Resolves the key and base URL from config into a ready client.
pub fn build_client(config: &ProviderConfig) -> Result<OpenAiClient, LecternError> {
    let api_key = resolve_api_key(&config.api_key)?;
    let client = OpenAiClient::new(&api_key)?;
    Ok(match &config.base_url {
        Some(url) => client.with_base_url(url.as_str()),
        None => client,
    })
}

fn to_chat_request(request: &CompletionRequest) -> ChatRequest {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system_prompt {
        messages.push(ChatMessage::new("system", system.as_str()));
    }
    messages.push(ChatMessage::new("user", request.prompt.as_str()));

    ChatRequest {
        model: request.model.clone(),
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, LecternError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LecternError> {
        debug!("OpenAI provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, LecternError> {
        let response = self.client.chat(&to_chat_request(&request)).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LecternError::provider("openai", "response contained no message content"))?;
        let usage = response.usage.unwrap_or_default();

        Ok(CompletionResponse {
            content,
            model: response.model,
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}

fn resolve_api_key(config_key: &Option<String>) -> Result<String, LecternError> {
    if let Some(key) = config_key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    std::env::var(API_KEY_ENV).map_err(|_| {
        LecternError::Config(format!(
            "OpenAI API key not found. Set providers.openai.api_key in config or {API_KEY_ENV} environment variable."
        ))
    })
}
