// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic embedding adapter for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use lectern_core::{
    AdapterType, EmbeddingAdapter, EmbeddingInput, EmbeddingOutput, HealthStatus, LecternError,
    PluginAdapter,
};

/// Hashes lowercase words into a fixed number of buckets and L2-normalizes.
///
/// Identical texts embed identically, texts sharing words have positive
/// cosine similarity, and text with no words embeds to the zero vector.
pub struct MockEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Embeds synchronously; exposed so tests can build expected vectors.
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = fnv1a(&word.to_lowercase()) as usize % self.dimensions;
            v[bucket] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
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
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, LecternError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| self.vector(t)).collect(),
            dimensions: self.dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn identical_text_embeds_identically() {
        let e = MockEmbedder::default();
        let a = e.vector("Consensus protocols tolerate faults");
        assert_eq!(a, e.vector("consensus PROTOCOLS tolerate faults"));
        assert!((dot(&a, &a) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let e = MockEmbedder::new(8);
        assert!(e.vector("  ...  ").iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn embeds_each_input() {
        let e = MockEmbedder::new(16);
        let out = e
            .embed(EmbeddingInput {
                texts: vec!["a b".into(), "c".into()],
            })
            .await
            .expect("embed");
        assert_eq!(out.embeddings.len(), 2);
        assert_eq!(out.dimensions, 16);
        assert_eq!(e.calls(), 1);
    }
}
