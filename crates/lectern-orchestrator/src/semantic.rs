// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding-based content profile.
//!
//! Each indicator category gets a prototype text (its name followed by its
//! terms). A document scores each category by the cosine similarity between
//! its embedding and the prototype's, with negative similarity read as zero.

use std::collections::BTreeMap;
use std::sync::Arc;

use lectern_config::IndicatorConfig;
use lectern_core::{EmbeddingAdapter, EmbeddingInput, LecternError};
use lectern_memory::cosine_similarity;
use lectern_router::ContentProfile;
use tokio::sync::OnceCell;
use tracing::debug;

pub struct SemanticProfiler {
    embedder: Arc<dyn EmbeddingAdapter>,
    prototypes: Vec<(String, String)>,
    vectors: OnceCell<Vec<Vec<f32>>>,
}

impl SemanticProfiler {
    pub fn new(
        embedder: Arc<dyn EmbeddingAdapter>,
        indicators: &BTreeMap<String, IndicatorConfig>,
    ) -> Self {
        let prototypes = indicators
            .iter()
            .map(|(name, indicator)| {
                let text = std::iter::once(name.as_str())
                    .chain(indicator.terms.iter().map(String::as_str))
                    .collect::<Vec<_>>()
                    .join(" ");
                (name.clone(), text)
            })
            .collect();
        Self {
            embedder,
            prototypes,
            vectors: OnceCell::new(),
        }
    }

    /// Scores `text` against every category. Blank text scores zero everywhere
    /// without calling the embedder.
    pub async fn profile(&self, text: &str) -> Result<ContentProfile, LecternError> {
        if text.trim().is_empty() {
            return ContentProfile::new(
                self.prototypes
                    .iter()
                    .map(|(name, _)| (name.clone(), 0.0))
                    .collect(),
            );
        }

        let prototypes = self.prototype_vectors().await?;
        let document = self.embedder.embed_one(text).await?;

        let scores = self
            .prototypes
            .iter()
            .zip(prototypes)
            .map(|((name, _), vector)| {
                let similarity = f64::from(cosine_similarity(&document, vector));
                let score = if similarity.is_finite() {
                    similarity.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                (name.clone(), score)
            })
            .collect::<BTreeMap<_, _>>();
        debug!(?scores, "semantic profile computed");
        ContentProfile::new(scores)
    }

    /// Prototype embeddings, fetched once in a single batch.
    async fn prototype_vectors(&self) -> Result<&Vec<Vec<f32>>, LecternError> {
        self.vectors
            .get_or_try_init(|| async {
                let texts: Vec<String> = self.prototypes.iter().map(|(_, t)| t.clone()).collect();
                let expected = texts.len();
                let output = self.embedder.embed(EmbeddingInput { texts }).await?;
                if output.embeddings.len() != expected {
                    return Err(LecternError::Internal(format!(
                        "embedder returned {} prototype vectors for {expected} categories",
                        output.embeddings.len()
                    )));
                }
                Ok(output.embeddings)
            })
            .await
    }
}
