// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Lectern research coordinator.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Top-level Lectern configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// Every section is optional; the defaults describe the stock three-model roster.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LecternConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Assignment weights, floor, and capacity bounds.
    #[serde(default)]
    pub assignment: AssignmentConfig,

    /// Content indicator table, keyed by category name.
    #[serde(default = "default_indicators")]
    pub indicators: BTreeMap<String, IndicatorConfig>,

    /// Section types, keyed by section name.
    #[serde(default = "default_sections")]
    pub sections: BTreeMap<String, SectionConfig>,

    /// The model roster.
    #[serde(default = "default_models")]
    pub models: Vec<ModelConfig>,

    /// Per-provider connection settings.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Topic analysis settings.
    #[serde(default)]
    pub topic: TopicConfig,

    /// Section archive settings.
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
}

impl Default for LecternConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            assignment: AssignmentConfig::default(),
            indicators: default_indicators(),
            sections: default_sections(),
            models: default_models(),
            providers: ProvidersConfig::default(),
            topic: TopicConfig::default(),
            vector_store: VectorStoreConfig::default(),
        }
    }
}

impl LecternConfig {
    /// Looks up a roster entry by id.
    pub fn model(&self, id: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Returns the profile category a section type is scored against.
    ///
    /// Sections without an explicit `category` map to the category of the same name.
    pub fn category_for<'a>(&'a self, section: &'a str) -> &'a str {
        self.sections
            .get(section)
            .and_then(|s| s.category.as_deref())
            .unwrap_or(section)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Weights and bounds for confidence scoring and assignment balancing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssignmentConfig {
    /// Tier weight when the section is the model's primary strength.
    #[serde(default = "default_primary_weight")]
    pub primary_weight: f64,

    /// Tier weight when the section is one of the model's secondary strengths.
    #[serde(default = "default_secondary_weight")]
    pub secondary_weight: f64,

    /// Tier weight for any other supported section.
    #[serde(default = "default_base_weight")]
    pub base_weight: f64,

    /// Assignments scoring below this are rejected.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Maximum number of sections any one model may be assigned.
    #[serde(default = "default_max_sections_per_model")]
    pub max_sections_per_model: usize,

    /// Optional cap on the total number of assignments across all models.
    #[serde(default)]
    pub max_total_sections: Option<usize>,

    /// Blend factor for the keyword indicator profile.
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,

    /// Blend factor for a semantic (embedding) profile, when one is supplied.
    #[serde(default)]
    pub semantic_weight: f64,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            primary_weight: default_primary_weight(),
            secondary_weight: default_secondary_weight(),
            base_weight: default_base_weight(),
            min_confidence: default_min_confidence(),
            max_sections_per_model: default_max_sections_per_model(),
            max_total_sections: None,
            keyword_weight: default_keyword_weight(),
            semantic_weight: 0.0,
        }
    }
}

fn default_primary_weight() -> f64 {
    1.0
}

fn default_secondary_weight() -> f64 {
    0.7
}

fn default_base_weight() -> f64 {
    0.5
}

fn default_min_confidence() -> f64 {
    0.3
}

fn default_max_sections_per_model() -> usize {
    2
}

fn default_keyword_weight() -> f64 {
    1.0
}

/// Indicator terms for one content category.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IndicatorConfig {
    /// Terms matched case-insensitively as substrings.
    pub terms: Vec<String>,

    /// Multiplier applied to the normalized category score.
    #[serde(default = "default_indicator_weight")]
    pub weight: f64,
}

fn default_indicator_weight() -> f64 {
    1.0
}

fn indicator(terms: &[&str]) -> IndicatorConfig {
    IndicatorConfig {
        terms: terms.iter().map(|t| t.to_string()).collect(),
        weight: default_indicator_weight(),
    }
}

fn default_indicators() -> BTreeMap<String, IndicatorConfig> {
    BTreeMap::from([
        (
            "technical".to_string(),
            indicator(&["algorithm", "system", "process", "data", "method", "technical"]),
        ),
        (
            "contextual".to_string(),
            indicator(&["history", "background", "context", "relationship", "pattern"]),
        ),
        (
            "subtextual".to_string(),
            indicator(&["culture", "meaning", "implication", "perspective", "value"]),
        ),
    ])
}

/// A section type that can be assigned to a model.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    /// Indicator category this section is scored against. Defaults to the section name.
    #[serde(default)]
    pub category: Option<String>,

    /// Approximate output budget used for prompts and cost estimates.
    #[serde(default = "default_token_budget")]
    pub token_budget: u32,

    /// One-line description included in the drafting prompt.
    #[serde(default)]
    pub description: String,
}

fn default_token_budget() -> u32 {
    2000
}

fn section(token_budget: u32, description: &str) -> SectionConfig {
    SectionConfig {
        category: None,
        token_budget,
        description: description.to_string(),
    }
}

fn default_sections() -> BTreeMap<String, SectionConfig> {
    BTreeMap::from([
        (
            "technical".to_string(),
            section(2500, "Technical deep-dive with precise analysis"),
        ),
        (
            "contextual".to_string(),
            section(
                3000,
                "Deep dive into historical and broader contextual factors",
            ),
        ),
        (
            "subtextual".to_string(),
            section(2000, "Analysis of subtle, implicit, and cultural dimensions"),
        ),
    ])
}

/// Which remote API a model is served by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Deserialize,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    Openai,
    Anthropic,
    Gemini,
}

/// One roster entry: a model and its capability profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Roster identifier used in assignment plans (e.g. "gpt4").
    pub id: String,

    /// Remote API serving this model.
    pub provider: ProviderKind,

    /// Remote model name sent with each request.
    pub model: String,

    /// The single category this model is strongest in.
    pub primary_strength: String,

    /// Further categories the model handles well, in preference order.
    #[serde(default)]
    pub secondary_strengths: Vec<String>,

    /// Section types this model may be assigned.
    pub supported_sections: Vec<String>,

    /// Context window, reported only.
    #[serde(default = "default_token_limit")]
    pub token_limit: u32,

    /// Price per 1K tokens in USD, reported only.
    #[serde(default)]
    pub cost_per_token: f64,

    /// Sampling temperature sent with completions.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_token_limit() -> u32 {
    8000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn all_sections() -> Vec<String> {
    ["technical", "contextual", "subtextual"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig {
            id: "gpt4".to_string(),
            provider: ProviderKind::Openai,
            model: "gpt-4-turbo-preview".to_string(),
            primary_strength: "technical".to_string(),
            secondary_strengths: vec!["contextual".to_string()],
            supported_sections: all_sections(),
            token_limit: 8000,
            cost_per_token: 0.01,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        },
        ModelConfig {
            id: "claude".to_string(),
            provider: ProviderKind::Anthropic,
            model: "claude-3-opus-20240229".to_string(),
            primary_strength: "contextual".to_string(),
            secondary_strengths: vec!["subtextual".to_string()],
            supported_sections: all_sections(),
            token_limit: 12000,
            cost_per_token: 0.008,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        },
        ModelConfig {
            id: "gemini".to_string(),
            provider: ProviderKind::Gemini,
            model: "gemini-1.5-pro".to_string(),
            primary_strength: "subtextual".to_string(),
            secondary_strengths: vec!["technical".to_string()],
            supported_sections: all_sections(),
            token_limit: 10000,
            cost_per_token: 0.005,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        },
    ]
}

/// Connection settings for each provider.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,

    #[serde(default)]
    pub anthropic: ProviderConfig,

    #[serde(default)]
    pub gemini: ProviderConfig,
}

impl ProvidersConfig {
    pub fn get(&self, kind: ProviderKind) -> &ProviderConfig {
        match kind {
            ProviderKind::Openai => &self.openai,
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::Gemini => &self.gemini,
        }
    }
}

/// Connection settings for one provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key. Falls back to the provider's conventional environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Override for the API base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// API version header (Anthropic only).
    #[serde(default)]
    pub api_version: Option<String>,

    /// Maximum in-flight requests to this provider.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-call deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a transient failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            api_version: None,
            max_concurrency: default_max_concurrency(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_max_concurrency() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    2
}

/// Topic analysis configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TopicConfig {
    /// Roster id of the model asked for the remote analysis.
    #[serde(default = "default_analysis_model")]
    pub analysis_model: String,

    /// Constant added to every heuristic score.
    #[serde(default = "default_heuristic_baseline")]
    pub heuristic_baseline: f64,

    /// Per-model dimension weights: `weights.<model_id>.<dimension> = weight`.
    #[serde(default = "default_topic_weights")]
    pub weights: BTreeMap<String, BTreeMap<String, f64>>,

    /// Keyword lists per dimension for the heuristic tier.
    #[serde(default = "default_topic_keywords")]
    pub keywords: BTreeMap<String, Vec<String>>,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            analysis_model: default_analysis_model(),
            heuristic_baseline: default_heuristic_baseline(),
            weights: default_topic_weights(),
            keywords: default_topic_keywords(),
        }
    }
}

fn default_analysis_model() -> String {
    "gpt4".to_string()
}

fn default_heuristic_baseline() -> f64 {
    0.2
}

fn weights(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(d, w)| (d.to_string(), *w)).collect()
}

fn default_topic_weights() -> BTreeMap<String, BTreeMap<String, f64>> {
    BTreeMap::from([
        (
            "gpt4".to_string(),
            weights(&[("technical", 0.8), ("theoretical", 0.6)]),
        ),
        (
            "claude".to_string(),
            weights(&[("theoretical", 0.8), ("societal", 0.6)]),
        ),
        (
            "gemini".to_string(),
            weights(&[("societal", 0.8), ("technical", 0.4)]),
        ),
    ])
}

fn terms(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

fn default_topic_keywords() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        (
            "technical".to_string(),
            terms(&[
                "implementation",
                "system",
                "architecture",
                "algorithm",
                "performance",
                "optimization",
                "code",
                "framework",
                "infrastructure",
                "technical",
                "programming",
            ]),
        ),
        (
            "theoretical".to_string(),
            terms(&[
                "history",
                "development",
                "evolution",
                "pattern",
                "relationship",
                "context",
                "background",
                "literature",
                "theory",
                "academic",
                "research",
            ]),
        ),
        (
            "societal".to_string(),
            terms(&[
                "society",
                "ethics",
                "impact",
                "culture",
                "values",
                "implications",
                "future",
                "social",
                "philosophical",
                "moral",
                "human",
            ]),
        ),
    ])
}

/// Section archive configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VectorStoreConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Provider used for embeddings.
    #[serde(default = "default_embedding_provider")]
    pub embedding_provider: ProviderKind,

    /// Remote embedding model name.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Minimum cosine similarity for a stored section to count as a match.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Weight of novelty in the quality score.
    #[serde(default = "default_novelty_weight")]
    pub novelty_weight: f64,

    /// Weight of coherence in the quality score.
    #[serde(default = "default_coherence_weight")]
    pub coherence_weight: f64,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            embedding_provider: default_embedding_provider(),
            embedding_model: default_embedding_model(),
            similarity_threshold: default_similarity_threshold(),
            novelty_weight: default_novelty_weight(),
            coherence_weight: default_coherence_weight(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("lectern").join("archive.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("lectern-archive.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_embedding_provider() -> ProviderKind {
    ProviderKind::Openai
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_similarity_threshold() -> f64 {
    0.7
}

fn default_novelty_weight() -> f64 {
    0.4
}

fn default_coherence_weight() -> f64 {
    0.6
}
