// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword indicator scoring.
//!
//! Scores text against per-category indicator terms. Pure, no network,
//! no allocation beyond the lowercased input and the result map.

use std::collections::BTreeMap;

use lectern_config::IndicatorConfig;

use crate::profile::ContentProfile;

/// Fraction of a category's terms that must match for a full score.
const SATURATION: f64 = 0.5;

#[derive(Debug, Clone)]
struct Category {
    name: String,
    /// Lowercased, non-blank terms.
    terms: Vec<String>,
    weight: f64,
}

/// Scores text against the configured indicator table.
#[derive(Debug, Clone)]
pub struct ContentAnalyzer {
    categories: Vec<Category>,
}

impl ContentAnalyzer {
    /// Builds an analyzer from the `[indicators]` table.
    pub fn new(indicators: &BTreeMap<String, IndicatorConfig>) -> Self {
        let categories = indicators
            .iter()
            .map(|(name, indicator)| Category {
                name: name.clone(),
                terms: indicator
                    .terms
                    .iter()
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect(),
                weight: indicator.weight,
            })
            .collect();
        Self { categories }
    }

    /// Category names in table order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Scores `text` for every configured category.
    ///
    /// A category scores `min(matches / (terms * 0.5), 1) * weight`, where
    /// `matches` counts distinct terms found as case-insensitive substrings.
    /// Empty text scores zero everywhere.
    pub fn analyze(&self, text: &str) -> ContentProfile {
        let lower = text.to_lowercase();
        let scores = self
            .categories
            .iter()
            .map(|category| (category.name.clone(), Self::category_score(&lower, category)))
            .collect();
        ContentProfile::from_clamped(scores)
    }

    fn category_score(lower: &str, category: &Category) -> f64 {
        if category.terms.is_empty() {
            return 0.0;
        }
        let matches = category
            .terms
            .iter()
            .filter(|term| lower.contains(term.as_str()))
            .count();
        let normalized = (matches as f64 / (category.terms.len() as f64 * SATURATION)).min(1.0);
        (normalized * category.weight).clamp(0.0, 1.0)
    }
}

impl Default for ContentAnalyzer {
    fn default() -> Self {
        Self::new(&lectern_config::LecternConfig::default().indicators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_scores_zero_everywhere() {
        let profile = ContentAnalyzer::default().analyze("");
        assert_eq!(profile.scores().len(), 3);
        assert!(profile.scores().values().all(|s| *s == 0.0));
    }

    #[test]
    fn technical_text_saturates() {
        let profile = ContentAnalyzer::default().analyze(
            "The algorithm processes data through a technical system using a novel method.",
        );
        assert_eq!(profile.score("technical"), 1.0);
        assert_eq!(profile.score("contextual"), 0.0);
    }

    #[test]
    fn repeated_terms_count_once() {
        let analyzer = ContentAnalyzer::default();
        let once = analyzer.analyze("pattern");
        let many = analyzer.analyze("pattern pattern PATTERN Pattern");
        assert_eq!(once.score("contextual"), many.score("contextual"));
        // 1 of 5 terms, saturating at 2.5
        assert!((once.score("contextual") - 0.4).abs() < 1e-9);
    }

    #[test]
    fn matching_is_substring_and_case_insensitive() {
        let profile = ContentAnalyzer::default().analyze("ALGORITHMS and Systems");
        // algorithm + system = 2 of 6, saturating at 3
        assert!((profile.score("technical") - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn category_weight_scales_score() {
        let indicators = BTreeMap::from([(
            "technical".to_string(),
            IndicatorConfig {
                terms: vec!["kernel".to_string(), "driver".to_string()],
                weight: 0.5,
            },
        )]);
        let profile = ContentAnalyzer::new(&indicators).analyze("kernel driver");
        assert_eq!(profile.score("technical"), 0.5);
    }

    #[test]
    fn blank_terms_are_ignored() {
        let indicators = BTreeMap::from([(
            "technical".to_string(),
            IndicatorConfig {
                terms: vec!["  ".to_string(), "".to_string()],
                weight: 1.0,
            },
        )]);
        let profile = ContentAnalyzer::new(&indicators).analyze("anything at all");
        assert_eq!(profile.score("technical"), 0.0);
    }
}
