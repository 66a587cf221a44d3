// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the adapter traits and the coordinator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Embedding,
    VectorStore,
}

/// A single input message handed to the coordinator.
///
/// Only `content` takes part in analysis; `role` is carried for callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Message {
    /// Creates a message with no role.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: None,
        }
    }
}

// --- Provider types ---

/// A single-shot completion request to an LLM provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Remote model name (e.g. "gpt-4-turbo-preview").
    pub model: String,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
}

/// Token accounting returned by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// The full text of a completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    /// Model name as reported by the provider.
    pub model: String,
    pub usage: TokenUsage,
}

// --- Embedding types ---

/// Texts to embed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// One vector per input text, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

// --- Vector store types ---

/// Flat string metadata attached to a stored vector.
pub type Metadata = BTreeMap<String, String>;

/// A vector with its source text and metadata, as written to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub text: String,
    pub metadata: Metadata,
}

/// A ranked result from a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorMatch {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
    /// Cosine similarity to the query vector.
    pub similarity: f32,
}

/// Exact-match metadata filter applied to similarity queries.
///
/// A record matches when every key is present with an equal value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    pub equals: Metadata,
}

impl MetadataFilter {
    /// Filter on a single key.
    pub fn eq(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut equals = Metadata::new();
        equals.insert(key.into(), value.into());
        Self { equals }
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.equals
            .iter()
            .all(|(k, v)| metadata.get(k).is_some_and(|found| found == v))
    }
}
