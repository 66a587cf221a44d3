// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store adapter trait.

use async_trait::async_trait;

use crate::error::LecternError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MetadataFilter, VectorMatch, VectorRecord};

/// Adapter for persisting vectors and ranking them by similarity.
#[async_trait]
pub trait VectorStoreAdapter: PluginAdapter {
    /// Inserts a record, replacing any existing record with the same id.
    async fn upsert(&self, record: VectorRecord) -> Result<(), LecternError>;

    /// Returns up to `k` records most similar to `embedding`, best first.
    async fn query(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<VectorMatch>, LecternError>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize, LecternError>;
}
