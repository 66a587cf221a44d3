// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confidence scoring for a (model, section) pair.

use std::collections::BTreeMap;

use lectern_config::{AssignmentConfig, LecternConfig};
use lectern_core::LecternError;

use crate::profile::ContentProfile;
use crate::registry::{ModelCapability, Tier};

/// Share of the tier weight granted regardless of content match.
pub const TIER_FLOOR_BLEND: f64 = 0.5;

/// Confidence shrinks by `1 / (1 + LOAD_PENALTY * prior)` per prior assignment.
pub const LOAD_PENALTY: f64 = 0.1;

/// Confidence and justification for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub confidence: f64,
    pub tier: Tier,
    pub reasoning: String,
}

/// Computes tiered confidence for assigning a section to a model.
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    primary_weight: f64,
    secondary_weight: f64,
    base_weight: f64,
    /// Section name -> profile category, for sections not named after their category.
    section_categories: BTreeMap<String, String>,
}

impl ConfidenceScorer {
    pub fn new(config: &AssignmentConfig) -> Self {
        Self {
            primary_weight: config.primary_weight,
            secondary_weight: config.secondary_weight,
            base_weight: config.base_weight,
            section_categories: BTreeMap::new(),
        }
    }

    /// Scorer with the `[sections]` category mapping applied.
    pub fn from_config(config: &LecternConfig) -> Self {
        let section_categories = config
            .sections
            .iter()
            .filter_map(|(name, section)| {
                section
                    .category
                    .as_ref()
                    .map(|category| (name.clone(), category.clone()))
            })
            .collect();
        Self {
            section_categories,
            ..Self::new(&config.assignment)
        }
    }

    pub fn tier_weight(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Primary => self.primary_weight,
            Tier::Secondary => self.secondary_weight,
            Tier::Base => self.base_weight,
        }
    }

    pub fn category_for<'a>(&'a self, section: &'a str) -> &'a str {
        self.section_categories
            .get(section)
            .map(String::as_str)
            .unwrap_or(section)
    }

    /// Scores `model` for `section` given the content profile and how many
    /// sections the model already holds.
    ///
    /// Fails with [`LecternError::Validation`] when the model does not support
    /// the section.
    pub fn score(
        &self,
        model: &ModelCapability,
        section: &str,
        profile: &ContentProfile,
        prior_assignments: usize,
    ) -> Result<ScoredCandidate, LecternError> {
        let tier = model.tier_for(section).ok_or_else(|| {
            LecternError::Validation(format!(
                "model `{}` does not support section `{section}`",
                model.id
            ))
        })?;

        let category = self.category_for(section);
        let content = profile.score(category);
        let raw = self.tier_weight(tier) * (TIER_FLOOR_BLEND + (1.0 - TIER_FLOOR_BLEND) * content);
        let penalty = 1.0 / (1.0 + LOAD_PENALTY * prior_assignments as f64);
        let confidence = (raw * penalty).clamp(0.0, 1.0);

        let mut reasoning = format!(
            "{tier} for {section} ({category} score {content:.2}, confidence {confidence:.2})"
        );
        if prior_assignments > 0 {
            reasoning.push_str(&format!(
                ", load-adjusted for {prior_assignments} prior assignment(s)"
            ));
        }

        Ok(ScoredCandidate {
            confidence,
            tier,
            reasoning,
        })
    }
}
