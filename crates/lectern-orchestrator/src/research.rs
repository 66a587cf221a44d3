// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Research pipeline: analyze the topic, plan sections, draft them across
//! providers, archive drafts.

use std::collections::BTreeMap;
use std::sync::Arc;

use lectern_config::{LecternConfig, ModelConfig, SectionConfig};
use lectern_core::{LecternError, Message, Metadata, TokenUsage};
use lectern_memory::{Section, SectionArchive, SectionMetrics};
use lectern_router::{AssignmentPlan, Coordinator, join_messages};
use serde::Serialize;
use tracing::{info, warn};

use crate::pool::{FanOutFailure, FanOutJob, ProviderPool, millis};
use crate::questions::{QuestionGenerator, QuestionSet};
use crate::semantic::SemanticProfiler;
use crate::topic::{TopicAnalysis, TopicAnalyzer};

const SYSTEM_PROMPT: &str = "You are a careful research analyst writing one section of a larger report.";

/// Token budget assumed for sections missing from `[sections]`.
const DEFAULT_TOKEN_BUDGET: u32 = 2000;

/// How the sections of a run were allocated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// The balancer spread sections across the roster.
    MultiModel,
    /// No candidate cleared the floor; the topic's lead model drafts alone.
    SingleModel { model_id: String, reason: String },
}

/// One drafted section.
#[derive(Debug, Clone, Serialize)]
pub struct SectionDraft {
    pub model_id: String,
    pub section_type: String,
    /// Balancer confidence; absent under the single-model strategy.
    pub confidence_score: Option<f64>,
    pub content: String,
    pub usage: TokenUsage,
    pub elapsed_ms: u64,
    /// Archive id and quality metrics, when the draft was archived.
    pub archive_id: Option<String>,
    pub metrics: Option<SectionMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    pub topic: String,
    pub strategy: Strategy,
    pub plan: AssignmentPlan,
    pub topic_analysis: TopicAnalysis,
    /// Questions from the topic's lead model, included in every section prompt.
    pub questions: QuestionSet,
    pub drafts: Vec<SectionDraft>,
    pub failures: Vec<FanOutFailure>,
    /// Sum of `token_budget / 1000 x cost_per_token` over every attempted section.
    pub estimated_cost: f64,
}

pub struct ResearchPipeline {
    coordinator: Coordinator,
    pool: Arc<ProviderPool>,
    topics: TopicAnalyzer,
    questions: QuestionGenerator,
    semantic: Option<Arc<SemanticProfiler>>,
    semantic_weight: f64,
    archive: Option<Arc<SectionArchive>>,
    sections: BTreeMap<String, SectionConfig>,
    models: BTreeMap<String, ModelConfig>,
}

impl ResearchPipeline {
    pub fn new(config: &LecternConfig, pool: Arc<ProviderPool>) -> Result<Self, LecternError> {
        let roster: Vec<String> = config.models.iter().map(|m| m.id.clone()).collect();
        Ok(Self {
            coordinator: Coordinator::from_config(config)?,
            topics: TopicAnalyzer::new(pool.clone(), config.topic.clone(), roster),
            questions: QuestionGenerator::new(pool.clone(), config.topic.clone()),
            semantic: None,
            semantic_weight: config.assignment.semantic_weight,
            pool,
            archive: None,
            sections: config.sections.clone(),
            models: config
                .models
                .iter()
                .map(|m| (m.id.clone(), m.clone()))
                .collect(),
        })
    }

    /// Archives every draft after it is written.
    pub fn with_archive(mut self, archive: Arc<SectionArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Blends an embedding profile into planning when `semantic_weight` is positive.
    pub fn with_semantic_profiler(mut self, profiler: Arc<SemanticProfiler>) -> Self {
        self.semantic = Some(profiler);
        self
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn topic_analyzer(&self) -> &TopicAnalyzer {
        &self.topics
    }

    pub fn question_generator(&self) -> &QuestionGenerator {
        &self.questions
    }

    /// Plans, drafts and archives a report on `topic` from `messages`.
    pub async fn run(
        &self,
        topic: &str,
        messages: &[Message],
    ) -> Result<ResearchOutcome, LecternError> {
        let source = join_messages(messages);
        let topic_analysis = self.topics.analyze(topic).await?;

        let (strategy, plan, planned) = match self.plan(messages, &source).await {
            Ok(plan) => {
                let planned: Vec<(String, String, Option<f64>)> = plan
                    .assignments()
                    .map(|a| {
                        (
                            a.model_id.clone(),
                            a.section_type.clone(),
                            Some(a.confidence_score),
                        )
                    })
                    .collect();
                (Strategy::MultiModel, plan, planned)
            }
            Err(e @ LecternError::NoViableAssignment { .. }) => {
                let model_id = topic_analysis.selected_model.clone();
                let section = self
                    .models
                    .get(&model_id)
                    .map(|m| m.primary_strength.clone())
                    .ok_or_else(|| {
                        LecternError::Config(format!(
                            "topic analysis selected `{model_id}`, which is not in the roster"
                        ))
                    })?;
                warn!(model_id = %model_id, section = %section, "falling back to single-model strategy");
                (
                    Strategy::SingleModel {
                        model_id: model_id.clone(),
                        reason: e.to_string(),
                    },
                    AssignmentPlan::default(),
                    vec![(model_id, section, None)],
                )
            }
            Err(e) => return Err(e),
        };

        let questions = self
            .questions
            .generate(topic, &topic_analysis.selected_model)
            .await?;

        let jobs: Vec<FanOutJob> = planned
            .iter()
            .map(|(model_id, section, _)| FanOutJob {
                label: label(model_id, section),
                model_id: model_id.clone(),
                prompt: self.section_prompt(topic, section, &source, &questions),
                system_prompt: Some(SYSTEM_PROMPT.to_string()),
            })
            .collect();
        let estimated_cost = planned
            .iter()
            .map(|(model_id, section, _)| self.section_cost(model_id, section))
            .sum();
        let confidence: BTreeMap<String, Option<f64>> = planned
            .iter()
            .map(|(model_id, section, c)| (label(model_id, section), *c))
            .collect();
        let sections: BTreeMap<String, String> = planned
            .into_iter()
            .map(|(model_id, section, _)| (label(&model_id, &section), section))
            .collect();

        let report = self.pool.fan_out(jobs).await?;

        let mut drafts = Vec::with_capacity(report.successes.len());
        for success in report.successes {
            let section_type = sections.get(&success.label).cloned().unwrap_or_default();
            let mut draft = SectionDraft {
                model_id: success.model_id,
                section_type,
                confidence_score: confidence.get(&success.label).copied().flatten(),
                content: success.response.content,
                usage: success.response.usage,
                elapsed_ms: millis(success.elapsed),
                archive_id: None,
                metrics: None,
            };
            self.archive_draft(topic, &mut draft).await;
            drafts.push(draft);
        }

        info!(
            topic,
            drafts = drafts.len(),
            failures = report.failures.len(),
            estimated_cost,
            "research run finished"
        );

        Ok(ResearchOutcome {
            topic: topic.to_string(),
            strategy,
            plan,
            topic_analysis,
            questions,
            drafts,
            failures: report.failures,
            estimated_cost,
        })
    }

    /// Keyword plan, blended with the semantic profile when one is configured.
    /// An unavailable embedder degrades to the keyword profile alone.
    async fn plan(&self, messages: &[Message], source: &str) -> Result<AssignmentPlan, LecternError> {
        let semantic = match &self.semantic {
            Some(profiler) if self.semantic_weight > 0.0 => match profiler.profile(source).await {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(error = %e, "semantic profile unavailable, planning on keywords only");
                    None
                }
            },
            _ => None,
        };
        match semantic {
            Some(profile) => self.coordinator.analyze_content_with(messages, &profile),
            None => self.coordinator.analyze_content(messages),
        }
    }

    async fn archive_draft(&self, topic: &str, draft: &mut SectionDraft) {
        let Some(archive) = &self.archive else {
            return;
        };
        let mut section = split_draft(&draft.content);
        section
            .metadata
            .insert("timestamp".into(), chrono::Utc::now().to_rfc3339());
        section
            .metadata
            .insert("section_type".into(), draft.section_type.clone());
        section.metadata.insert("topic".into(), topic.to_string());

        match archive
            .store_section(&section, &draft.model_id, &draft.section_type)
            .await
        {
            Ok(stored) => {
                draft.archive_id = Some(stored.id);
                draft.metrics = Some(stored.metrics);
            }
            Err(e) => {
                warn!(
                    model_id = %draft.model_id,
                    section = %draft.section_type,
                    error = %e,
                    "failed to archive draft"
                );
            }
        }
    }

    fn section_prompt(
        &self,
        topic: &str,
        section: &str,
        source: &str,
        questions: &QuestionSet,
    ) -> String {
        let (description, budget) = match self.sections.get(section) {
            Some(s) => (s.description.as_str(), s.token_budget),
            None => ("", DEFAULT_TOKEN_BUDGET),
        };
        let focus = if description.is_empty() {
            String::new()
        } else {
            format!("Focus: {description}\n")
        };
        let questions = questions
            .questions
            .iter()
            .map(|q| format!("- {}", q.text))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Write the {section} section of a research report on \"{topic}\".\n\
             {focus}\
             Stay within roughly {budget} tokens. Start with a Markdown heading, \
             follow with a one-paragraph summary, then the body.\n\n\
             Research questions:\n{questions}\n\n\
             Source material:\n{source}"
        )
    }

    fn section_cost(&self, model_id: &str, section: &str) -> f64 {
        let budget = self
            .sections
            .get(section)
            .map_or(DEFAULT_TOKEN_BUDGET, |s| s.token_budget);
        let rate = self.models.get(model_id).map_or(0.0, |m| m.cost_per_token);
        f64::from(budget) / 1000.0 * rate
    }
}

fn label(model_id: &str, section: &str) -> String {
    format!("{model_id}/{section}")
}

/// Splits model output into title (first line, heading marks removed),
/// summary (first paragraph after it) and body (the rest).
pub fn split_draft(content: &str) -> Section {
    let trimmed = content.trim();
    let (first, rest) = trimmed.split_once('\n').unwrap_or((trimmed, ""));
    let title = first.trim_start_matches('#').trim().to_string();

    let rest = rest.trim();
    let (summary, body) = match rest.split_once("\n\n") {
        Some((summary, body)) => (summary.trim(), body.trim()),
        None => (rest, ""),
    };

    Section {
        title,
        summary: summary.to_string(),
        body: body.to_string(),
        metadata: Metadata::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_draft_reads_heading_summary_body() {
        let section = split_draft(
            "## Consensus Under Partition\n\nRaft trades availability for safety.\n\nFirst paragraph.\n\nSecond paragraph.",
        );
        assert_eq!(section.title, "Consensus Under Partition");
        assert_eq!(section.summary, "Raft trades availability for safety.");
        assert_eq!(section.body, "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn split_draft_handles_single_line() {
        let section = split_draft("just one line");
        assert_eq!(section.title, "just one line");
        assert!(section.summary.is_empty());
        assert!(section.body.is_empty());
    }

    #[test]
    fn label_joins_model_and_section() {
        assert_eq!(label("gpt4", "technical"), "gpt4/technical");
    }
}
