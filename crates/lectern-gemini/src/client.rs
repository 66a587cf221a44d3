// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` API.

use std::time::Duration;

use lectern_core::{LecternError, is_transient_status};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// Default API root; `/v1beta/models/{model}:generateContent` is appended.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const PROVIDER: &str = "gemini";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Result<Self, LecternError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| LecternError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

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

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Generates content with `model` (e.g. "gemini-1.5-pro").
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LecternError> {
        let url = format!("{}/v1beta/models/{model}:generateContent", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| LecternError::Provider {
                provider: PROVIDER.into(),
                message: format!("HTTP request failed: {e}"),
                transient: e.is_timeout() || e.is_connect(),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model, "generateContent response received");

        let body = response.text().await.map_err(|e| LecternError::Provider {
            provider: PROVIDER.into(),
            message: format!("failed to read response body: {e}"),
            transient: true,
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Gemini API error ({}): {}",
                    api_err.error.status.as_deref().unwrap_or("UNKNOWN"),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(LecternError::Provider {
                provider: PROVIDER.into(),
                message,
                transient: is_transient_status(status.as_u16()),
                source: None,
            });
        }

        serde_json::from_str(&body).map_err(|e| LecternError::Provider {
            provider: PROVIDER.into(),
            message: format!("failed to parse API response: {e}"),
            transient: false,
            source: Some(Box::new(e)),
        })
    }
}
