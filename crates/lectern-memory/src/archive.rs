// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Section archive: embeds drafted sections, scores their quality against
//! what is already stored, and tracks per-section-type performance.

use std::collections::BTreeMap;
use std::sync::Arc;

use lectern_config::VectorStoreConfig;
use lectern_core::{
    EmbeddingAdapter, LecternError, Metadata, MetadataFilter, VectorMatch, VectorRecord,
    VectorStoreAdapter,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::types::{ArchivedSection, Section, SectionMetrics, SectionPerformance};

/// Neighbours consulted when computing novelty.
const NOVELTY_NEIGHBOURS: usize = 3;

/// Quality at or above which an attempt counts as a success.
pub const SUCCESS_QUALITY: f64 = 0.5;

/// Scoring knobs, usually taken from `[vector_store]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchiveSettings {
    pub similarity_threshold: f64,
    pub novelty_weight: f64,
    pub coherence_weight: f64,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            novelty_weight: 0.4,
            coherence_weight: 0.6,
        }
    }
}

impl From<&VectorStoreConfig> for ArchiveSettings {
    fn from(config: &VectorStoreConfig) -> Self {
        Self {
            similarity_threshold: config.similarity_threshold,
            novelty_weight: config.novelty_weight,
            coherence_weight: config.coherence_weight,
        }
    }
}

/// Embedding-backed archive of drafted sections.
pub struct SectionArchive {
    embedder: Arc<dyn EmbeddingAdapter>,
    store: Arc<dyn VectorStoreAdapter>,
    settings: ArchiveSettings,
    performance: Mutex<BTreeMap<String, SectionPerformance>>,
}

impl SectionArchive {
    pub fn new(
        embedder: Arc<dyn EmbeddingAdapter>,
        store: Arc<dyn VectorStoreAdapter>,
        settings: ArchiveSettings,
    ) -> Self {
        Self {
            embedder,
            store,
            settings,
            performance: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn settings(&self) -> ArchiveSettings {
        self.settings
    }

    /// Scores a section, stores it, and folds the result into the running statistics.
    pub async fn store_section(
        &self,
        section: &Section,
        model_id: &str,
        section_type: &str,
    ) -> Result<ArchivedSection, LecternError> {
        let text = section.text();
        let embedding = self.embedder.embed_one(&text).await?;

        let neighbours = self
            .store
            .query(&embedding, NOVELTY_NEIGHBOURS, None)
            .await?;
        let metrics = self.metrics(section, &neighbours);

        let id = uuid::Uuid::new_v4().to_string();
        let mut metadata = section.metadata.clone();
        metadata.insert("model_id".into(), model_id.to_string());
        metadata.insert("section_type".into(), section_type.to_string());
        metadata.insert("timestamp".into(), chrono::Utc::now().to_rfc3339());
        metadata.insert("quality_score".into(), metrics.quality_score.to_string());
        metadata.insert("novelty_score".into(), metrics.novelty_score.to_string());
        metadata.insert("coherence_score".into(), metrics.coherence_score.to_string());

        self.store
            .upsert(VectorRecord {
                id: id.clone(),
                embedding,
                text,
                metadata,
            })
            .await?;

        self.record_attempt(section_type, metrics.quality_score).await;

        info!(
            id = %id,
            model_id,
            section_type,
            quality = metrics.quality_score,
            "section archived"
        );

        Ok(ArchivedSection {
            id,
            section_type: section_type.to_string(),
            model_id: model_id.to_string(),
            metrics,
        })
    }

    /// Returns up to `k` stored entries whose similarity to `query` is at least `threshold`.
    pub async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        threshold: f64,
        section_type: Option<&str>,
    ) -> Result<Vec<VectorMatch>, LecternError> {
        let embedding = self.embedder.embed_one(query).await?;
        let filter = section_type.map(|s| MetadataFilter::eq("section_type", s));
        let hits = self.store.query(&embedding, k, filter.as_ref()).await?;
        Ok(hits
            .into_iter()
            .filter(|hit| f64::from(hit.similarity) >= threshold)
            .collect())
    }

    /// Stores a free-form document. Metadata values are stringified; null becomes "".
    pub async fn add_document(
        &self,
        text: &str,
        metadata: impl IntoIterator<Item = (String, serde_json::Value)>,
    ) -> Result<String, LecternError> {
        let metadata: Metadata = metadata
            .into_iter()
            .map(|(key, value)| (key, stringify(value)))
            .collect();
        let embedding = self.embedder.embed_one(text).await?;
        let id = uuid::Uuid::new_v4().to_string();
        debug!(id = %id, keys = metadata.len(), "adding document");

        self.store
            .upsert(VectorRecord {
                id: id.clone(),
                embedding,
                text: text.to_string(),
                metadata,
            })
            .await?;
        Ok(id)
    }

    /// Snapshot of the running statistics, keyed by section type.
    pub async fn section_performance(&self) -> BTreeMap<String, SectionPerformance> {
        self.performance.lock().await.clone()
    }

    fn metrics(&self, section: &Section, neighbours: &[VectorMatch]) -> SectionMetrics {
        let close: Vec<f64> = neighbours
            .iter()
            .map(|m| f64::from(m.similarity))
            .filter(|s| *s >= self.settings.similarity_threshold)
            .collect();
        let novelty_score = if close.is_empty() {
            1.0
        } else {
            (1.0 - close.iter().sum::<f64>() / close.len() as f64).clamp(0.0, 1.0)
        };

        let coherence_score = coherence(section);
        let quality_score = self.settings.novelty_weight * novelty_score
            + self.settings.coherence_weight * coherence_score;

        SectionMetrics {
            novelty_score,
            coherence_score,
            quality_score,
        }
    }

    async fn record_attempt(&self, section_type: &str, quality: f64) {
        let mut performance = self.performance.lock().await;
        let entry = performance.entry(section_type.to_string()).or_default();
        entry.total_attempts += 1;
        let n = entry.total_attempts as f64;
        let success = if quality >= SUCCESS_QUALITY { 1.0 } else { 0.0 };
        entry.success_rate += (success - entry.success_rate) / n;
        entry.avg_quality += (quality - entry.avg_quality) / n;
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Fraction of the five structural checks a section passes.
fn coherence(section: &Section) -> f64 {
    let checks = [
        word_count(&section.title) >= 3,
        word_count(&section.summary) >= 20,
        word_count(&section.body) >= 100,
        !section.title.trim().is_empty()
            && !section.summary.trim().is_empty()
            && !section.body.trim().is_empty(),
        section.metadata.contains_key("timestamp") && section.metadata.contains_key("section_type"),
    ];
    checks.iter().filter(|c| **c).count() as f64 / checks.len() as f64
}

fn stringify(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn coherence_counts_each_check() {
        let mut section = Section {
            title: "Three word title".into(),
            summary: words(20),
            body: words(100),
            metadata: Metadata::new(),
        };
        assert!((coherence(&section) - 0.8).abs() < 1e-9);

        section.metadata.insert("timestamp".into(), "now".into());
        section.metadata.insert("section_type".into(), "technical".into());
        assert!((coherence(&section) - 1.0).abs() < 1e-9);

        section.body = words(99);
        assert!((coherence(&section) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn empty_section_scores_zero_coherence() {
        assert_eq!(coherence(&Section::default()), 0.0);
    }

    #[test]
    fn stringify_flattens_json_values() {
        assert_eq!(stringify(serde_json::Value::Null), "");
        assert_eq!(stringify(serde_json::json!("x")), "x");
        assert_eq!(stringify(serde_json::json!(3)), "3");
        assert_eq!(stringify(serde_json::json!(true)), "true");
        assert_eq!(stringify(serde_json::json!(["a"])), "[\"a\"]");
    }

    #[test]
    fn settings_follow_config() {
        let config = VectorStoreConfig {
            similarity_threshold: 0.8,
            novelty_weight: 0.5,
            coherence_weight: 0.5,
            ..VectorStoreConfig::default()
        };
        let settings = ArchiveSettings::from(&config);
        assert_eq!(settings.similarity_threshold, 0.8);
        assert_eq!(settings.novelty_weight, 0.5);
    }
}
