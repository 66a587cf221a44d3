// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry point tying content analysis, scoring, and balancing together.

use lectern_config::LecternConfig;
use lectern_core::{LecternError, Message};
use tracing::info;

use crate::analyzer::ContentAnalyzer;
use crate::balancer::{AssignmentBalancer, AssignmentPlan};
use crate::profile::ContentProfile;
use crate::registry::ModelRegistry;
use crate::scorer::ConfidenceScorer;

/// Turns input messages into a section assignment plan.
///
/// Holds only immutable state, so a shared reference can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Coordinator {
    analyzer: ContentAnalyzer,
    registry: ModelRegistry,
    balancer: AssignmentBalancer,
}

impl Coordinator {
    pub fn new(
        analyzer: ContentAnalyzer,
        registry: ModelRegistry,
        balancer: AssignmentBalancer,
    ) -> Self {
        Self {
            analyzer,
            registry,
            balancer,
        }
    }

    /// Builds the coordinator from a validated configuration.
    pub fn from_config(config: &LecternConfig) -> Result<Self, LecternError> {
        Ok(Self::new(
            ContentAnalyzer::new(&config.indicators),
            ModelRegistry::from_config(config)?,
            AssignmentBalancer::new(
                config.assignment.clone(),
                ConfidenceScorer::from_config(config),
            ),
        ))
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn analyzer(&self) -> &ContentAnalyzer {
        &self.analyzer
    }

    /// Keyword profile of the newline-joined message contents.
    pub fn profile(&self, messages: &[Message]) -> ContentProfile {
        self.analyzer.analyze(&join_messages(messages))
    }

    /// Analyzes the messages and balances sections across the roster.
    pub fn analyze_content(&self, messages: &[Message]) -> Result<AssignmentPlan, LecternError> {
        let profile = self.profile(messages);
        self.balance(messages.len(), &profile)
    }

    /// Like [`analyze_content`](Self::analyze_content), blending a semantic
    /// profile into the keyword profile using the configured
    /// `keyword_weight` / `semantic_weight`.
    pub fn analyze_content_with(
        &self,
        messages: &[Message],
        semantic: &ContentProfile,
    ) -> Result<AssignmentPlan, LecternError> {
        let config = self.balancer.config();
        let profile = self.profile(messages).blend(
            semantic,
            config.keyword_weight,
            config.semantic_weight,
        )?;
        self.balance(messages.len(), &profile)
    }

    fn balance(
        &self,
        message_count: usize,
        profile: &ContentProfile,
    ) -> Result<AssignmentPlan, LecternError> {
        let plan = self.balancer.assign(&self.registry, profile)?;
        let dominant = profile.dominant().map(|(name, _)| name).unwrap_or("none");
        info!(
            messages = message_count,
            dominant_category = dominant,
            assignments = plan.total(),
            "section assignment plan built"
        );
        Ok(plan)
    }
}

/// Joins message contents with newlines, preserving order.
pub fn join_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
