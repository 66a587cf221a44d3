// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Research questions for the model leading a topic.
//!
//! The remote tier asks the model for questions shaped by its strongest
//! topic dimension. Any remote failure, or a reply with no list items,
//! drops to fixed templates for that dimension.

use std::collections::BTreeMap;
use std::sync::Arc;

use lectern_config::TopicConfig;
use lectern_core::LecternError;
use serde::Serialize;
use tracing::{info, warn};

use crate::pool::ProviderPool;

const SYSTEM_PROMPT: &str = "You are a research planner. Reply with a Markdown list of questions only.";

/// Questions kept per set.
pub const QUESTION_COUNT: usize = 5;

/// Where a question set came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QuestionSource {
    /// Questions were written by the named roster model.
    Remote { model: String },
    /// Fixed templates, with the remote failure that triggered them.
    Template { reason: String },
}

/// The kind of investigation a question calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchType {
    Technical,
    Academic,
    Trend,
    General,
}

impl ResearchType {
    /// Classifies by the first matching cue word.
    pub fn classify(question: &str) -> Self {
        let lowered = question.to_lowercase();
        let has = |cues: &[&str]| cues.iter().any(|c| lowered.contains(c));
        if has(&["how", "implementation", "system", "technical"]) {
            Self::Technical
        } else if has(&["why", "theory", "framework", "concept"]) {
            Self::Academic
        } else if has(&["future", "trend", "potential", "impact"]) {
            Self::Trend
        } else {
            Self::General
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchQuestion {
    pub text: String,
    pub category: String,
    pub research_type: ResearchType,
}

impl ResearchQuestion {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            category: categorize(&text).to_string(),
            research_type: ResearchType::classify(&text),
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionSet {
    pub model_id: String,
    /// Topic dimension the questions were shaped by.
    pub focus: String,
    pub questions: Vec<ResearchQuestion>,
    pub source: QuestionSource,
}

/// Two-tier question generator over the provider pool.
pub struct QuestionGenerator {
    pool: Arc<ProviderPool>,
    config: TopicConfig,
}

impl QuestionGenerator {
    pub fn new(pool: Arc<ProviderPool>, config: TopicConfig) -> Self {
        Self { pool, config }
    }

    /// Generates questions on `topic` from `model_id`, falling back to templates.
    pub async fn generate(&self, topic: &str, model_id: &str) -> Result<QuestionSet, LecternError> {
        if !self.pool.contains(model_id) {
            return Err(LecternError::Validation(format!(
                "cannot generate questions with unknown model `{model_id}`"
            )));
        }
        let focus = self.focus(model_id);

        let (questions, source) = match self.remote(topic, model_id, &focus).await {
            Ok(questions) => (
                questions,
                QuestionSource::Remote {
                    model: model_id.to_string(),
                },
            ),
            Err(e) => {
                warn!(model_id, error = %e, "remote question generation failed, using templates");
                (
                    templates(&focus, topic),
                    QuestionSource::Template {
                        reason: e.to_string(),
                    },
                )
            }
        };

        info!(model_id, focus = %focus, questions = questions.len(), source = ?source, "research questions ready");
        Ok(QuestionSet {
            model_id: model_id.to_string(),
            focus,
            questions,
            source,
        })
    }

    /// The model's highest-weighted topic dimension; `general` when it has none.
    pub fn focus(&self, model_id: &str) -> String {
        self.config
            .weights
            .get(model_id)
            .and_then(strongest)
            .unwrap_or_else(|| "general".to_string())
    }

    async fn remote(
        &self,
        topic: &str,
        model_id: &str,
        focus: &str,
    ) -> Result<Vec<ResearchQuestion>, LecternError> {
        let response = self
            .pool
            .complete(model_id, &prompt(topic, focus), Some(SYSTEM_PROMPT))
            .await?;
        let questions: Vec<ResearchQuestion> = list_items(&response.content)
            .into_iter()
            .take(QUESTION_COUNT)
            .map(ResearchQuestion::new)
            .collect();
        if questions.is_empty() {
            return Err(LecternError::provider(model_id, "reply contained no list items"));
        }
        Ok(questions)
    }
}

/// Highest weight; the lexically first dimension breaks ties.
fn strongest(weights: &BTreeMap<String, f64>) -> Option<String> {
    weights
        .iter()
        .fold(None::<(&String, f64)>, |best, (dim, w)| match best {
            Some((_, bw)) if bw >= *w => best,
            _ => Some((dim, *w)),
        })
        .map(|(dim, _)| dim.clone())
}

fn focus_areas(focus: &str) -> &'static [&'static str] {
    match focus {
        "technical" => &[
            "technical implementation details",
            "system architecture",
            "performance considerations",
            "technical challenges",
            "optimization opportunities",
        ],
        "theoretical" => &[
            "historical context",
            "theoretical frameworks",
            "pattern analysis",
            "evolution of understanding",
            "interdisciplinary connections",
        ],
        "societal" => &[
            "ethical implications",
            "societal impact",
            "cultural considerations",
            "value systems",
            "social norms",
        ],
        _ => &[
            "core concepts",
            "current state",
            "open problems",
            "practical applications",
            "future directions",
        ],
    }
}

fn prompt(topic: &str, focus: &str) -> String {
    let areas = focus_areas(focus)
        .iter()
        .map(|a| format!("- {a}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Generate {QUESTION_COUNT} research questions about \"{topic}\" from a {focus} perspective.\n\
         Cover these areas:\n{areas}\n\n\
         Write each question on its own line starting with \"- \"."
    )
}

/// Bulleted or numbered lines with their markers stripped.
fn list_items(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let item = if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
                rest
            } else {
                let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
                if digits == 0 {
                    return None;
                }
                line[digits..]
                    .strip_prefix(". ")
                    .or_else(|| line[digits..].strip_prefix(") "))?
            };
            let item = item.trim();
            (!item.is_empty()).then(|| item.to_string())
        })
        .collect()
}

fn templates(focus: &str, topic: &str) -> Vec<ResearchQuestion> {
    let patterns: [&str; QUESTION_COUNT] = match focus {
        "technical" => [
            "What are the core technical components of {topic}?",
            "How does the implementation of {topic} compare to similar systems?",
            "What are the key performance considerations for {topic}?",
            "What technical challenges arise when building {topic}?",
            "How can {topic} be optimized?",
        ],
        "theoretical" => [
            "What is the historical development of {topic}?",
            "How does {topic} relate to existing theoretical frameworks?",
            "What patterns recur in {topic} across different contexts?",
            "How has the understanding of {topic} evolved?",
            "What interdisciplinary connections does {topic} have?",
        ],
        "societal" => [
            "What are the ethical implications of {topic}?",
            "How does {topic} affect different groups in society?",
            "What cultural factors shape the reception of {topic}?",
            "Which value systems does {topic} challenge or reinforce?",
            "How does {topic} interact with existing social norms?",
        ],
        _ => [
            "What are the core concepts behind {topic}?",
            "What is the current state of {topic}?",
            "What open problems remain in {topic}?",
            "Where is {topic} applied in practice?",
            "What future developments are expected for {topic}?",
        ],
    };
    patterns
        .iter()
        .map(|p| ResearchQuestion::new(p.replace("{topic}", topic)))
        .collect()
}

/// First category whose cue appears in the question; `general` otherwise.
fn categorize(question: &str) -> &'static str {
    const CUES: [(&str, &[&str]); 4] = [
        ("technical", &["technical", "implementation", "performance", "system"]),
        ("theoretical", &["theoretical", "framework", "concept", "principle"]),
        ("practical", &["practical", "application", "usage", "applied"]),
        ("impact", &["impact", "effect", "influence", "implications"]),
    ];
    let lowered = question.to_lowercase();
    CUES.iter()
        .find(|(_, cues)| cues.iter().any(|c| lowered.contains(c)))
        .map_or("general", |&(category, _)| category)
}
