// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider pool: per-model adapters behind per-provider concurrency limits.
//!
//! Every call acquires a permit from its provider's semaphore, runs under the
//! provider's deadline, and is retried on transient failure with linear
//! backoff. Provider clients themselves are single-shot.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use lectern_config::{LecternConfig, ModelConfig, ProviderConfig, ProviderKind};
use lectern_core::{CompletionRequest, CompletionResponse, LecternError, ProviderAdapter};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Default delay unit between retries; attempt `n` waits `n` units.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

struct PoolModel {
    provider: Arc<dyn ProviderAdapter>,
    provider_name: String,
    remote_model: String,
    temperature: f32,
    max_tokens: u32,
}

struct ProviderLimits {
    semaphore: Arc<Semaphore>,
    timeout: Duration,
    max_retries: u32,
}

/// Shared access to every roster model's provider.
pub struct ProviderPool {
    models: BTreeMap<String, PoolModel>,
    limits: BTreeMap<String, ProviderLimits>,
    retry_backoff: Duration,
}

impl Default for ProviderPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderPool {
    pub fn new() -> Self {
        Self {
            models: BTreeMap::new(),
            limits: BTreeMap::new(),
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Builds the pool for the configured roster.
    ///
    /// `factory` is called once per provider kind in use; models sharing a
    /// provider share its adapter and its concurrency limit.
    pub fn from_config<F>(config: &LecternConfig, mut factory: F) -> Result<Self, LecternError>
    where
        F: FnMut(ProviderKind, &ProviderConfig) -> Result<Arc<dyn ProviderAdapter>, LecternError>,
    {
        let mut adapters: BTreeMap<ProviderKind, Arc<dyn ProviderAdapter>> = BTreeMap::new();
        let mut pool = Self::new();
        for model in &config.models {
            let provider_config = config.providers.get(model.provider);
            let adapter = match adapters.get(&model.provider) {
                Some(adapter) => adapter.clone(),
                None => {
                    let adapter = factory(model.provider, provider_config)?;
                    adapters.insert(model.provider, adapter.clone());
                    adapter
                }
            };
            pool.register(model, adapter, provider_config);
        }
        info!(
            models = pool.models.len(),
            providers = pool.limits.len(),
            "provider pool ready"
        );
        Ok(pool)
    }

    /// Adds a model. The first registration for a provider fixes its limits.
    pub fn register(
        &mut self,
        model: &ModelConfig,
        provider: Arc<dyn ProviderAdapter>,
        limits: &ProviderConfig,
    ) {
        let provider_name = model.provider.to_string();
        self.limits
            .entry(provider_name.clone())
            .or_insert_with(|| ProviderLimits {
                semaphore: Arc::new(Semaphore::new(limits.max_concurrency.max(1))),
                timeout: Duration::from_secs(limits.timeout_secs.max(1)),
                max_retries: limits.max_retries,
            });
        self.models.insert(
            model.id.clone(),
            PoolModel {
                provider,
                provider_name,
                remote_model: model.model.clone(),
                temperature: model.temperature,
                max_tokens: model.max_tokens,
            },
        );
    }

    /// Overrides the retry backoff unit.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Overrides the per-call deadline for one provider.
    pub fn with_timeout(mut self, provider: &str, timeout: Duration) -> Self {
        if let Some(limits) = self.limits.get_mut(provider) {
            limits.timeout = timeout;
        }
        self
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.models.contains_key(model_id)
    }

    pub fn model_ids(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Sends one prompt to a roster model.
    pub async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<CompletionResponse, LecternError> {
        let model = self.models.get(model_id).ok_or_else(|| {
            LecternError::Validation(format!("model `{model_id}` is not in the provider pool"))
        })?;
        let limits = self.limits.get(&model.provider_name).ok_or_else(|| {
            LecternError::Internal(format!("no limits registered for `{}`", model.provider_name))
        })?;

        let request = CompletionRequest {
            model: model.remote_model.clone(),
            prompt: prompt.to_string(),
            system_prompt: system_prompt.map(str::to_string),
            temperature: Some(model.temperature),
            max_tokens: model.max_tokens,
        };

        let mut attempt = 0u32;
        loop {
            match self.attempt(model, limits, request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < limits.max_retries => {
                    attempt += 1;
                    let delay = self.retry_backoff * attempt;
                    warn!(
                        model_id,
                        attempt,
                        delay_ms = millis(delay),
                        error = %e,
                        "transient provider failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt(
        &self,
        model: &PoolModel,
        limits: &ProviderLimits,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, LecternError> {
        let _permit = limits.semaphore.acquire().await.map_err(|e| {
            LecternError::Internal(format!("{} semaphore closed: {e}", model.provider_name))
        })?;

        match tokio::time::timeout(limits.timeout, model.provider.complete(request)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(LecternError::Timeout {
                provider: model.provider_name.clone(),
                duration: limits.timeout,
            }),
        }
    }

    /// Completes a prompt that must answer with a JSON object carrying `required_keys`.
    pub async fn structured_completion(
        &self,
        model_id: &str,
        prompt: &str,
        system_prompt: Option<&str>,
        required_keys: &[&str],
    ) -> Result<Map<String, Value>, LecternError> {
        let response = self.complete(model_id, prompt, system_prompt).await?;
        let object = parse_json_object(&response.content)
            .ok_or_else(|| LecternError::provider(model_id, "response was not a JSON object"))?;

        let missing: Vec<&str> = required_keys
            .iter()
            .copied()
            .filter(|key| !object.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(LecternError::provider(
                model_id,
                format!("structured response is missing keys: {}", missing.join(", ")),
            ));
        }
        Ok(object)
    }

    /// Runs every job concurrently, keeping successes and failures in job order.
    ///
    /// Fails only when every job fails.
    pub async fn fan_out(&self, jobs: Vec<FanOutJob>) -> Result<FanOutReport, LecternError> {
        let attempted = jobs.len();
        let runs = jobs.into_iter().map(|job| async move {
            let started = Instant::now();
            let result = self
                .complete(&job.model_id, &job.prompt, job.system_prompt.as_deref())
                .await;
            (job, started.elapsed(), result)
        });

        let mut report = FanOutReport::default();
        for (job, elapsed, result) in join_all(runs).await {
            match result {
                Ok(response) => {
                    debug!(label = %job.label, elapsed_ms = millis(elapsed), "job completed");
                    report.successes.push(FanOutSuccess {
                        label: job.label,
                        model_id: job.model_id,
                        response,
                        elapsed,
                    });
                }
                Err(e) => {
                    warn!(label = %job.label, error = %e, "job failed");
                    report.failures.push(FanOutFailure {
                        label: job.label,
                        model_id: job.model_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        if attempted > 0 && report.successes.is_empty() {
            return Err(LecternError::AllProvidersFailed {
                attempted,
                failures: report
                    .failures
                    .into_iter()
                    .map(|f| (f.label, f.error))
                    .collect(),
            });
        }

        info!(
            attempted,
            succeeded = report.successes.len(),
            failed = report.failures.len(),
            "fan-out finished"
        );
        Ok(report)
    }
}

/// One prompt destined for one roster model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutJob {
    /// Caller-chosen identifier echoed in the report.
    pub label: String,
    pub model_id: String,
    pub prompt: String,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FanOutSuccess {
    pub label: String,
    pub model_id: String,
    pub response: CompletionResponse,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FanOutFailure {
    pub label: String,
    pub model_id: String,
    pub error: String,
}

/// Outcome of a fan-out with at least one success.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FanOutReport {
    pub successes: Vec<FanOutSuccess>,
    pub failures: Vec<FanOutFailure>,
}

mod duration_ms {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(super::millis(*d))
    }
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Extracts a JSON object from model output, tolerating Markdown fences and
/// prose around the object.
pub fn parse_json_object(text: &str) -> Option<Map<String, Value>> {
    let stripped = strip_code_fences(text);
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(stripped) {
        return Some(map);
    }
    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&stripped[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Removes a surrounding ```` ``` ```` or ```` ```json ```` fence, if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
