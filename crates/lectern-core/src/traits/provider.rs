// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for LLM completion services (OpenAI, Anthropic, Gemini).

use async_trait::async_trait;

use crate::error::LecternError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, CompletionResponse};

/// Adapter for LLM completion services.
///
/// Implementations make exactly one attempt per call. Retries, timeouts and
/// concurrency limits are applied by the caller.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, LecternError>;
}
