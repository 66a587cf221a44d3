// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Lectern research coordinator.
//!
//! This crate provides the trait definitions, error type, and common types
//! used throughout the Lectern workspace. Provider, embedding, and vector
//! store adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{LecternError, is_transient_status};
pub use types::{
    AdapterType, CompletionRequest, CompletionResponse, EmbeddingInput, EmbeddingOutput,
    HealthStatus, Message, Metadata, MetadataFilter, TokenUsage, VectorMatch, VectorRecord,
};

pub use traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter, VectorStoreAdapter};
