// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider adapter for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use lectern_core::{
    AdapterType, CompletionRequest, CompletionResponse, HealthStatus, LecternError,
    PluginAdapter, ProviderAdapter, TokenUsage,
};

/// One scripted outcome for a `complete` call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    /// Fails with a provider error; `transient` controls retry eligibility.
    Fail { message: String, transient: bool },
}

/// A mock LLM provider that replays scripted replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty the
/// fallback reply is used, which defaults to the text "mock response".
pub struct MockProvider {
    name: String,
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    fallback: MockReply,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replies: Arc::new(Mutex::new(VecDeque::new())),
            fallback: MockReply::Text("mock response".to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues text replies in order.
    pub fn with_responses(self, responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let queued = responses
            .into_iter()
            .map(|r| MockReply::Text(r.into()))
            .collect();
        Self {
            replies: Arc::new(Mutex::new(queued)),
            ..self
        }
    }

    /// A provider whose every call fails.
    pub fn failing(name: impl Into<String>, message: impl Into<String>, transient: bool) -> Self {
        Self {
            fallback: MockReply::Fail {
                message: message.into(),
                transient,
            },
            ..Self::new(name)
        }
    }

    /// Sleeps before answering each call.
    pub fn with_delay(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }

    pub async fn push_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in order.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        &self.name
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
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, LecternError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.next_reply().await {
            MockReply::Text(content) => Ok(CompletionResponse {
                content,
                model: request.model,
                usage: TokenUsage {
                    input_tokens: 10,
                    output_tokens: 20,
                },
            }),
            MockReply::Fail { message, transient } => Err(LecternError::Provider {
                provider: self.name.clone(),
                message,
                transient,
                source: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "mock-model".to_string(),
            prompt: "hello".to_string(),
            system_prompt: None,
            temperature: None,
            max_tokens: 100,
        }
    }

    #[tokio::test]
    async fn replays_queue_then_default() {
        let provider = MockProvider::new("mock").with_responses(["first", "second"]);
        assert_eq!(provider.complete(request()).await.expect("ok").content, "first");
        assert_eq!(provider.complete(request()).await.expect("ok").content, "second");
        assert_eq!(
            provider.complete(request()).await.expect("ok").content,
            "mock response"
        );
        assert_eq!(provider.calls(), 3);
        assert_eq!(provider.requests().await.len(), 3);
    }

    #[tokio::test]
    async fn failing_provider_reports_transience() {
        let provider = MockProvider::failing("down", "503 overloaded", true);
        let err = provider.complete(request()).await.expect_err("fails");
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn scripted_failure_then_success() {
        let provider = MockProvider::new("flaky");
        provider
            .push_reply(MockReply::Fail {
                message: "rate limited".into(),
                transient: true,
            })
            .await;
        assert!(provider.complete(request()).await.is_err());
        assert!(provider.complete(request()).await.is_ok());
    }
}
