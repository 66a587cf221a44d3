// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Topic analysis: picks the roster model best suited to lead a topic.
//!
//! The remote tier asks the analysis model to rate the topic on each
//! dimension. Any remote failure drops to a keyword heuristic, so analysis
//! always produces a selection as long as some roster model has weights.

use std::collections::BTreeMap;
use std::sync::Arc;

use lectern_config::TopicConfig;
use lectern_core::LecternError;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::pool::ProviderPool;

const SYSTEM_PROMPT: &str = "You are an expert in AI model capabilities analysis.";

/// Where a topic analysis came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnalysisSource {
    /// Scores were produced by the named roster model.
    Remote { model: String },
    /// Keyword fallback, with the remote failure that triggered it.
    Heuristic { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicAnalysis {
    pub selected_model: String,
    /// Suitability per roster model.
    pub scores: BTreeMap<String, f64>,
    /// Topic score per dimension, in [0, 1].
    pub dimensions: BTreeMap<String, f64>,
    pub reasoning: String,
    pub source: AnalysisSource,
}

/// Two-tier topic analyzer over the provider pool.
pub struct TopicAnalyzer {
    pool: Arc<ProviderPool>,
    config: TopicConfig,
    roster: Vec<String>,
}

impl TopicAnalyzer {
    /// `roster` lists the model ids eligible for selection.
    pub fn new(pool: Arc<ProviderPool>, config: TopicConfig, roster: Vec<String>) -> Self {
        Self {
            pool,
            config,
            roster,
        }
    }

    /// Analyzes `topic`, falling back to keywords when the remote tier fails.
    pub async fn analyze(&self, topic: &str) -> Result<TopicAnalysis, LecternError> {
        let analysis = match self.remote(topic).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(error = %e, "remote topic analysis failed, using keyword heuristic");
                self.heuristic(topic, e.to_string())?
            }
        };
        info!(
            selected_model = %analysis.selected_model,
            source = ?analysis.source,
            "topic analyzed"
        );
        Ok(analysis)
    }

    async fn remote(&self, topic: &str) -> Result<TopicAnalysis, LecternError> {
        let dims = self.dimension_names();
        let keys: Vec<String> = dims.iter().map(|d| format!("{d}_score")).collect();
        let mut required: Vec<&str> = keys.iter().map(String::as_str).collect();
        required.push("reasoning");

        let model = self.config.analysis_model.as_str();
        let response = self
            .pool
            .structured_completion(model, &self.prompt(topic, &dims), Some(SYSTEM_PROMPT), &required)
            .await?;

        let mut dimensions = BTreeMap::new();
        for (dim, key) in dims.iter().zip(&keys) {
            dimensions.insert(dim.clone(), number(&response, key, model)?);
        }
        let reasoning = match response.get("reasoning") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let scores = self.weighted_scores(&dimensions);
        let selected_model = select(&scores)
            .ok_or_else(|| LecternError::Config("no roster model has topic weights".into()))?;

        Ok(TopicAnalysis {
            selected_model,
            scores,
            dimensions,
            reasoning,
            source: AnalysisSource::Remote {
                model: model.to_string(),
            },
        })
    }

    /// Keyword fallback. Each model is credited through its strongest dimension only.
    pub fn heuristic(&self, topic: &str, reason: String) -> Result<TopicAnalysis, LecternError> {
        let lowered = topic.to_lowercase();
        let dimensions: BTreeMap<String, f64> = self
            .config
            .keywords
            .iter()
            .map(|(dim, words)| {
                let score = if words.is_empty() {
                    0.0
                } else {
                    let hits = words
                        .iter()
                        .filter(|w| lowered.contains(&w.to_lowercase()))
                        .count();
                    hits as f64 / words.len() as f64
                };
                (dim.clone(), score)
            })
            .collect();

        let mut scores = BTreeMap::new();
        for model in &self.roster {
            let Some(weights) = self.config.weights.get(model) else {
                continue;
            };
            // Highest weight wins; the lexically first dimension breaks ties.
            let primary = weights
                .iter()
                .fold(None::<(&String, f64)>, |best, (dim, w)| match best {
                    Some((_, bw)) if bw >= *w => best,
                    _ => Some((dim, *w)),
                });
            let credit = primary
                .map(|(dim, w)| w * dimensions.get(dim).copied().unwrap_or(0.0))
                .unwrap_or(0.0);
            scores.insert(model.clone(), credit + self.config.heuristic_baseline);
        }

        let selected_model = select(&scores)
            .ok_or_else(|| LecternError::Config("no roster model has topic weights".into()))?;

        Ok(TopicAnalysis {
            selected_model,
            scores,
            dimensions,
            reasoning: "keyword-based analysis".to_string(),
            source: AnalysisSource::Heuristic { reason },
        })
    }

    fn weighted_scores(&self, dimensions: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
        self.roster
            .iter()
            .filter_map(|model| {
                let weights = self.config.weights.get(model)?;
                let score = weights
                    .iter()
                    .map(|(dim, w)| w * dimensions.get(dim).copied().unwrap_or(0.0))
                    .sum();
                Some((model.clone(), score))
            })
            .collect()
    }

    /// Every dimension named in the weights or keywords tables.
    fn dimension_names(&self) -> Vec<String> {
        let mut dims: Vec<String> = self
            .config
            .weights
            .values()
            .flat_map(|w| w.keys().cloned())
            .chain(self.config.keywords.keys().cloned())
            .collect();
        dims.sort();
        dims.dedup();
        dims
    }

    fn prompt(&self, topic: &str, dims: &[String]) -> String {
        let fields = dims
            .iter()
            .map(|d| format!("    \"{d}_score\": <float between 0 and 1>,"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Given a topic, rate how strongly it calls for each of these dimensions: {}.\n\n\
             Topic: {topic}\n\n\
             Respond with only a JSON object:\n{{\n{fields}\n    \"reasoning\": \"<brief explanation>\"\n}}",
            dims.join(", ")
        )
    }
}

fn number(map: &Map<String, Value>, key: &str, model: &str) -> Result<f64, LecternError> {
    let value = match map.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    value
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
        .ok_or_else(|| LecternError::provider(model, format!("`{key}` is not a number")))
}

/// Highest score; ties go to the lexically smaller id.
fn select(scores: &BTreeMap<String, f64>) -> Option<String> {
    scores
        .iter()
        .fold(None::<(&String, f64)>, |best, (id, s)| match best {
            Some((_, bs)) if bs >= *s => best,
            _ => Some((id, *s)),
        })
        .map(|(id, _)| id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn select_prefers_highest() {
        assert_eq!(
            select(&scores(&[("claude", 0.9), ("gemini", 0.4), ("gpt4", 0.7)])).as_deref(),
            Some("claude")
        );
    }

    #[test]
    fn select_breaks_ties_lexically() {
        assert_eq!(
            select(&scores(&[("gpt4", 0.5), ("claude", 0.5)])).as_deref(),
            Some("claude")
        );
        assert!(select(&BTreeMap::new()).is_none());
    }

    #[test]
    fn number_clamps_and_accepts_strings() {
        let map: Map<String, Value> = serde_json::from_str(
            r#"{"a": 1.7, "b": "0.25", "c": -3, "d": "high", "e": null}"#,
        )
        .unwrap();
        assert_eq!(number(&map, "a", "m").unwrap(), 1.0);
        assert_eq!(number(&map, "b", "m").unwrap(), 0.25);
        assert_eq!(number(&map, "c", "m").unwrap(), 0.0);
        assert!(number(&map, "d", "m").is_err());
        assert!(number(&map, "e", "m").is_err());
    }
}
