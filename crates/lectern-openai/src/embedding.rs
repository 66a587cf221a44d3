// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote embeddings via `POST /v1/embeddings`.

use async_trait::async_trait;
use lectern_config::ProviderConfig;
use lectern_core::{
    AdapterType, EmbeddingAdapter, EmbeddingInput, EmbeddingOutput, HealthStatus, LecternError,
    PluginAdapter,
};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::EmbeddingRequest;

/// Embedding adapter backed by an OpenAI embedding model.
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
}

impl OpenAiEmbedder {
    /// Creates an embedder for `model` (e.g. "text-embedding-3-small").
    pub fn new(config: &ProviderConfig, model: impl Into<String>) -> Result<Self, LecternError> {
        let model = model.into();
        let client = crate::build_client(config)?;
        info!(model = %model, "OpenAI embedder initialized");
        Ok(Self { client, model })
    }

    pub fn with_client(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai-embeddings"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, LecternError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LecternError> {
        debug!("OpenAI embedder shutting down");
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, LecternError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: 0,
            });
        }

        let expected = input.texts.len();
        let mut response = self
            .client
            .embeddings(&EmbeddingRequest {
                model: self.model.clone(),
                input: input.texts,
            })
            .await?;

        if response.data.len() != expected {
            return Err(LecternError::provider(
                "openai",
                format!(
                    "embedding response has {} vectors for {expected} inputs",
                    response.data.len()
                ),
            ));
        }

        response.data.sort_by_key(|d| d.index);
        let embeddings: Vec<Vec<f32>> = response.data.into_iter().map(|d| d.embedding).collect();
        let dimensions = embeddings.first().map_or(0, Vec::len);
        debug!(count = embeddings.len(), dimensions, "embeddings received");

        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder(uri: String) -> OpenAiEmbedder {
        let client = OpenAiClient::new("sk-test").unwrap().with_base_url(uri);
        OpenAiEmbedder::with_client(client, "text-embedding-3-small")
    }

    #[tokio::test]
    async fn embeddings_are_returned_in_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [
                    {"object": "embedding", "index": 1, "embedding": [0.0, 1.0, 0.0]},
                    {"object": "embedding", "index": 0, "embedding": [1.0, 0.0, 0.0]}
                ],
                "model": "text-embedding-3-small"
            })))
            .mount(&server)
            .await;

        let output = embedder(server.uri())
            .embed(EmbeddingInput {
                texts: vec!["first".into(), "second".into()],
            })
            .await
            .unwrap();

        assert_eq!(output.dimensions, 3);
        assert_eq!(output.embeddings[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(output.embeddings[1], vec![0.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn embed_one_unwraps_single_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"index": 0, "embedding": [0.5, 0.5]}]
            })))
            .mount(&server)
            .await;

        let vector = embedder(server.uri()).embed_one("hello").await.unwrap();
        assert_eq!(vector, vec![0.5, 0.5]);
    }

    #[tokio::test]
    async fn empty_input_skips_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let output = embedder(server.uri())
            .embed(EmbeddingInput { texts: Vec::new() })
            .await
            .unwrap();
        assert!(output.embeddings.is_empty());
    }

    #[tokio::test]
    async fn count_mismatch_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"index": 0, "embedding": [0.5]}]
            })))
            .mount(&server)
            .await;

        let err = embedder(server.uri())
            .embed(EmbeddingInput {
                texts: vec!["a".into(), "b".into()],
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("1 vectors for 2 inputs"), "got: {err}");
    }
}
