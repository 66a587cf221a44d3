// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude provider adapter for Lectern.
//!
//! Implements [`ProviderAdapter`] over the Anthropic Messages API with
//! single-shot, non-streaming completions.

pub mod client;
pub mod types;

use async_trait::async_trait;
use lectern_config::ProviderConfig;
use lectern_core::{
    AdapterType, CompletionRequest, CompletionResponse, HealthStatus, LecternError, PluginAdapter,
    ProviderAdapter, TokenUsage,
};
use tracing::{debug, info};

use crate::client::{AnthropicClient, DEFAULT_API_VERSION};
use crate::types::{ApiMessage, MessageRequest};

/// Environment variable consulted when the config carries no key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Anthropic Claude provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicProvider {
    client: AnthropicClient,
}

impl AnthropicProvider {
    /// Creates a provider from the `[providers.anthropic]` section.
    pub fn new(config: &ProviderConfig) -> Result<Self, LecternError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let api_version = config.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION);
        let mut client = AnthropicClient::new(&api_key, api_version)?;
        if let Some(url) = &config.base_url {
            client = client.with_base_url(url.as_str());
        }

        info!(api_version, "Anthropic provider initialized");
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: AnthropicClient) -> Self {
        Self { client }
    }
}

fn to_message_request(request: &CompletionRequest) -> MessageRequest {
    MessageRequest {
        model: request.model.clone(),
        messages: vec![ApiMessage {
            role: "user".into(),
            content: request.prompt.clone(),
        }],
        system: request.system_prompt.clone(),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    }
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
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
        debug!("Anthropic provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, LecternError> {
        let response = self
            .client
            .complete_message(&to_message_request(&request))
            .await?;

        Ok(CompletionResponse {
            content: response.text(),
            model: response.model,
            usage: TokenUsage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
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
            "Anthropic API key not found. Set providers.anthropic.api_key in config or {API_KEY_ENV} environment variable."
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "claude-3-opus-20240229".into(),
            prompt: "Summarize the history of the printing press.".into(),
            system_prompt: Some("You are a historian.".into()),
            temperature: Some(0.7),
            max_tokens: 512,
        }
    }

    #[test]
    fn request_conversion_carries_system_prompt() {
        let req = to_message_request(&request());
        assert_eq!(req.system.as_deref(), Some("You are a historian."));
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, "user");
        assert_eq!(req.max_tokens, 512);
    }

    #[test]
    fn resolve_api_key_from_config() {
        let key = resolve_api_key(&Some("sk-ant-test".into())).unwrap();
        assert_eq!(key, "sk-ant-test");
    }

    #[test]
    fn resolve_api_key_empty_config_falls_back_to_env() {
        let result = resolve_api_key(&Some(String::new()));
        // Succeeds only when ANTHROPIC_API_KEY is set; never yields the empty key.
        match result {
            Ok(key) => assert!(!key.is_empty()),
            Err(e) => assert!(e.to_string().contains("API key not found"), "got: {e}"),
        }
    }

    #[test]
    fn adapter_metadata() {
        let client = AnthropicClient::new("k", DEFAULT_API_VERSION).unwrap();
        let provider = AnthropicProvider::with_client(client);
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.adapter_type(), AdapterType::Provider);
        assert_eq!(provider.version(), semver::Version::new(0, 1, 0));
    }

    #[tokio::test]
    async fn complete_joins_text_blocks_and_maps_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(serde_json::json!({
                "system": "You are a historian.",
                "max_tokens": 512
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "content": [
                    {"type": "text", "text": "Gutenberg "},
                    {"type": "text", "text": "changed everything."}
                ],
                "model": "claude-3-opus-20240229",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 21, "output_tokens": 4}
            })))
            .mount(&server)
            .await;

        let config = ProviderConfig {
            api_key: Some("sk-ant-test".into()),
            base_url: Some(server.uri()),
            ..ProviderConfig::default()
        };
        let provider = AnthropicProvider::new(&config).unwrap();
        let response = provider.complete(request()).await.unwrap();

        assert_eq!(response.content, "Gutenberg changed everything.");
        assert_eq!(response.model, "claude-3-opus-20240229");
        assert_eq!(response.usage.input_tokens, 21);
        assert_eq!(response.usage.output_tokens, 4);
    }
}
