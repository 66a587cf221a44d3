// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for Lectern.

pub mod client;
pub mod types;

use async_trait::async_trait;
use lectern_config::ProviderConfig;
use lectern_core::{
    AdapterType, CompletionRequest, CompletionResponse, HealthStatus, LecternError, PluginAdapter,
    ProviderAdapter, TokenUsage,
};
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerationConfig};

/// Environment variable consulted when the config carries no key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    /// Creates a provider from the `[providers.gemini]` section.
    pub fn new(config: &ProviderConfig) -> Result<Self, LecternError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let mut client = GeminiClient::new(&api_key)?;
        if let Some(url) = &config.base_url {
            client = client.with_base_url(url.as_str());
        }
        info!("Gemini provider initialized");
        Ok(Self { client })
    }

    pub fn with_client(client: GeminiClient) -> Self {
        Self { client }
    }
}

fn to_generate_request(request: &CompletionRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::text(Some("user"), request.prompt.as_str())],
        system_instruction: request
            .system_prompt
            .as_deref()
            .map(|s| Content::text(None, s)),
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
        },
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
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
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, LecternError> {
        let response = self
            .client
            .generate_content(&request.model, &to_generate_request(&request))
            .await?;

        let content = response
            .text()
            .ok_or_else(|| LecternError::provider("gemini", "response contained no candidates"))?;
        let usage = response.usage_metadata.unwrap_or_default();

        Ok(CompletionResponse {
            content,
            model: response.model_version.unwrap_or(request.model),
            usage: TokenUsage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
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
            "Gemini API key not found. Set providers.gemini.api_key in config or {API_KEY_ENV} environment variable."
        ))
    })
}
