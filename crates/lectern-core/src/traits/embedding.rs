// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::LecternError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Adapter for generating vector embeddings from text.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Generates one embedding per input text.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, LecternError>;

    /// Convenience for embedding a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, LecternError> {
        let output = self
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| LecternError::provider(self.name(), "embedding response was empty"))
    }
}
