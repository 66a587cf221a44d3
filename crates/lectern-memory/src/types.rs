// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive domain types and vector helpers.

use serde::{Deserialize, Serialize};

use lectern_core::Metadata;

/// A drafted report section handed to the archive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub summary: String,
    pub body: String,
    /// Caller-supplied metadata. `timestamp` and `section_type` count toward coherence.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Section {
    /// The text that is embedded and stored: title, summary and body on separate lines.
    pub fn text(&self) -> String {
        format!("{}\n{}\n{}", self.title, self.summary, self.body)
    }
}

/// Quality metrics computed when a section is archived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionMetrics {
    /// 1.0 minus the mean similarity to close neighbours; 1.0 with no neighbours.
    pub novelty_score: f64,
    /// Fraction of structural checks passed.
    pub coherence_score: f64,
    /// Weighted blend of novelty and coherence.
    pub quality_score: f64,
}

/// Result of archiving one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchivedSection {
    pub id: String,
    pub section_type: String,
    pub model_id: String,
    pub metrics: SectionMetrics,
}

/// Running statistics for one section type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionPerformance {
    pub total_attempts: u64,
    /// Running fraction of attempts whose quality reached the success bar.
    pub success_rate: f64,
    pub avg_quality: f64,
}

/// Convert f32 vector to bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert SQLite BLOB back to f32 vector. Trailing partial chunks are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when the lengths differ or either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
