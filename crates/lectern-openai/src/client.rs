// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI REST API.

use std::time::Duration;

use lectern_core::{LecternError, is_transient_status};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse};

/// Default API root; versioned paths are appended.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

const PROVIDER: &str = "openai";

/// Bearer-authenticated client shared by the chat and embedding adapters.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str) -> Result<Self, LecternError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| LecternError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| LecternError::Provider {
                provider: PROVIDER.into(),
                message: format!("failed to build HTTP client: {e}"),
                transient: false,
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Overrides the API root (proxies, Azure-style gateways, wiremock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// `POST /v1/chat/completions`.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LecternError> {
        self.post("/v1/chat/completions", request).await
    }

    /// `POST /v1/embeddings`.
    pub async fn embeddings(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResponse, LecternError> {
        self.post("/v1/embeddings", request).await
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, LecternError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| LecternError::Provider {
                provider: PROVIDER.into(),
                message: format!("HTTP request failed: {e}"),
                transient: e.is_timeout() || e.is_connect(),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, path, "OpenAI response received");

        let text = response.text().await.map_err(|e| LecternError::Provider {
            provider: PROVIDER.into(),
            message: format!("failed to read response body: {e}"),
            transient: true,
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&text) {
                Ok(api_err) => format!(
                    "OpenAI API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {text}"),
            };
            return Err(LecternError::Provider {
                provider: PROVIDER.into(),
                message,
                transient: is_transient_status(status.as_u16()),
                source: None,
            });
        }

        serde_json::from_str(&text).map_err(|e| LecternError::Provider {
            provider: PROVIDER.into(),
            message: format!("failed to parse API response: {e}"),
            transient: false,
            source: Some(Box::new(e)),
        })
    }
}
