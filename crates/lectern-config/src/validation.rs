// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the semantic rules serde cannot express: weight ordering, roster
//! consistency, and cross-references between sections. All errors are
//! collected; validation does not stop at the first failure.

use std::collections::BTreeSet;

use crate::diagnostic::ConfigError;
use crate::model::{
    AssignmentConfig, LecternConfig, ModelConfig, ProviderKind, TopicConfig, VectorStoreConfig,
};

/// Validates a deserialized configuration.
pub fn validate_config(config: &LecternConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !matches!(
        config.logging.level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        errors.push(ConfigError::validation(format!(
            "logging.level must be one of trace, debug, info, warn, error; got `{}`",
            config.logging.level
        )));
    }

    validate_assignment(&config.assignment, &mut errors);

    for (category, indicator) in &config.indicators {
        if indicator.terms.iter().all(|t| t.trim().is_empty()) {
            errors.push(ConfigError::validation(format!(
                "indicators.{category}.terms must contain at least one term"
            )));
        }
        if !(indicator.weight > 0.0 && indicator.weight <= 1.0) {
            errors.push(ConfigError::validation(format!(
                "indicators.{category}.weight must be in (0, 1], got {}",
                indicator.weight
            )));
        }
    }

    for (name, section) in &config.sections {
        let category = section.category.as_deref().unwrap_or(name);
        if !config.indicators.contains_key(category) {
            errors.push(ConfigError::validation(format!(
                "sections.{name} is scored against unknown indicator category `{category}`"
            )));
        }
    }

    if config.models.is_empty() {
        errors.push(ConfigError::validation(
            "the model roster is empty; add at least one [[models]] entry",
        ));
    }

    let mut seen = BTreeSet::new();
    for model in &config.models {
        if !seen.insert(model.id.as_str()) {
            errors.push(ConfigError::validation(format!(
                "duplicate model id `{}` in [[models]]",
                model.id
            )));
        }
        validate_model(model, &mut errors);
        for section in &model.supported_sections {
            let category = config.category_for(section);
            if !config.indicators.contains_key(category) {
                errors.push(ConfigError::validation(format!(
                    "model `{}` supports section `{section}`, which maps to unknown indicator category `{category}`",
                    model.id
                )));
            }
        }
    }

    for (name, provider) in [
        ("openai", &config.providers.openai),
        ("anthropic", &config.providers.anthropic),
        ("gemini", &config.providers.gemini),
    ] {
        if provider.max_concurrency == 0 {
            errors.push(ConfigError::validation(format!(
                "providers.{name}.max_concurrency must be at least 1"
            )));
        }
        if provider.timeout_secs == 0 {
            errors.push(ConfigError::validation(format!(
                "providers.{name}.timeout_secs must be at least 1"
            )));
        }
    }

    validate_topic(&config.topic, config, &mut errors);
    validate_vector_store(&config.vector_store, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_assignment(a: &AssignmentConfig, errors: &mut Vec<ConfigError>) {
    for (name, weight) in [
        ("primary_weight", a.primary_weight),
        ("secondary_weight", a.secondary_weight),
        ("base_weight", a.base_weight),
    ] {
        if !(weight > 0.0 && weight <= 1.0) {
            errors.push(ConfigError::validation(format!(
                "assignment.{name} must be in (0, 1], got {weight}"
            )));
        }
    }

    // Tier ordering only holds for strictly decreasing weights.
    if !(a.primary_weight > a.secondary_weight && a.secondary_weight > a.base_weight) {
        errors.push(ConfigError::validation(format!(
            "assignment weights must satisfy primary > secondary > base, got {} / {} / {}",
            a.primary_weight, a.secondary_weight, a.base_weight
        )));
    }

    if !(0.0..=1.0).contains(&a.min_confidence) {
        errors.push(ConfigError::validation(format!(
            "assignment.min_confidence must be in [0, 1], got {}",
            a.min_confidence
        )));
    }

    if a.max_sections_per_model == 0 {
        errors.push(ConfigError::validation(
            "assignment.max_sections_per_model must be at least 1",
        ));
    }

    if a.max_total_sections == Some(0) {
        errors.push(ConfigError::validation(
            "assignment.max_total_sections must be at least 1 when set",
        ));
    }

    if !(a.keyword_weight.is_finite() && a.semantic_weight.is_finite()) {
        errors.push(ConfigError::validation(format!(
            "assignment.keyword_weight and assignment.semantic_weight must be finite, got {} / {}",
            a.keyword_weight, a.semantic_weight
        )));
    } else if a.keyword_weight < 0.0 || a.semantic_weight < 0.0 {
        errors.push(ConfigError::validation(format!(
            "assignment.keyword_weight and assignment.semantic_weight must be non-negative, got {} / {}",
            a.keyword_weight, a.semantic_weight
        )));
    } else if a.keyword_weight + a.semantic_weight <= 0.0 {
        errors.push(ConfigError::validation(
            "assignment.keyword_weight and assignment.semantic_weight cannot both be zero",
        ));
    }
}

fn validate_model(model: &ModelConfig, errors: &mut Vec<ConfigError>) {
    let id = &model.id;
    if id.trim().is_empty() {
        errors.push(ConfigError::validation("models[].id must not be empty"));
    }
    if model.model.trim().is_empty() {
        errors.push(ConfigError::validation(format!(
            "model `{id}` must name a remote model"
        )));
    }
    if model.supported_sections.is_empty() {
        errors.push(ConfigError::validation(format!(
            "model `{id}` must support at least one section"
        )));
    }
    if model.secondary_strengths.contains(&model.primary_strength) {
        errors.push(ConfigError::validation(format!(
            "model `{id}` lists its primary strength `{}` as a secondary strength",
            model.primary_strength
        )));
    }
    for strength in std::iter::once(&model.primary_strength).chain(&model.secondary_strengths) {
        if !model.supported_sections.contains(strength) {
            errors.push(ConfigError::validation(format!(
                "model `{id}` has strength `{strength}` missing from supported_sections"
            )));
        }
    }
    if !(model.cost_per_token.is_finite() && model.cost_per_token >= 0.0) {
        errors.push(ConfigError::validation(format!(
            "model `{id}` must have a finite, non-negative cost_per_token, got {}",
            model.cost_per_token
        )));
    }
    if !(model.temperature.is_finite() && model.temperature >= 0.0) {
        errors.push(ConfigError::validation(format!(
            "model `{id}` must have a finite, non-negative temperature, got {}",
            model.temperature
        )));
    }
}

fn validate_topic(topic: &TopicConfig, config: &LecternConfig, errors: &mut Vec<ConfigError>) {
    if config.model(&topic.analysis_model).is_none() {
        errors.push(ConfigError::validation(format!(
            "topic.analysis_model `{}` is not in the model roster",
            topic.analysis_model
        )));
    }
    if !(0.0..=1.0).contains(&topic.heuristic_baseline) {
        errors.push(ConfigError::validation(format!(
            "topic.heuristic_baseline must be in [0, 1], got {}",
            topic.heuristic_baseline
        )));
    }
    for (model, dims) in &topic.weights {
        for (dimension, weight) in dims {
            if !(weight.is_finite() && *weight >= 0.0) {
                errors.push(ConfigError::validation(format!(
                    "topic.weights.{model}.{dimension} must be finite and non-negative, got {weight}"
                )));
            }
        }
    }
}

fn validate_vector_store(store: &VectorStoreConfig, errors: &mut Vec<ConfigError>) {
    if store.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "vector_store.database_path must not be empty",
        ));
    }
    if store.embedding_provider != ProviderKind::Openai {
        errors.push(ConfigError::validation(format!(
            "vector_store.embedding_provider must be `openai`, got `{}`",
            store.embedding_provider
        )));
    }
    for (name, value) in [
        ("similarity_threshold", store.similarity_threshold),
        ("novelty_weight", store.novelty_weight),
        ("coherence_weight", store.coherence_weight),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::validation(format!(
                "vector_store.{name} must be in [0, 1], got {value}"
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(result: Result<(), Vec<ConfigError>>) -> Vec<String> {
        result
            .expect_err("expected validation errors")
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&LecternConfig::default()).is_ok());
    }

    #[test]
    fn tier_weights_must_be_strictly_decreasing() {
        let mut config = LecternConfig::default();
        config.assignment.secondary_weight = 0.5;
        let errs = messages(validate_config(&config));
        assert!(errs.iter().any(|m| m.contains("primary > secondary > base")));
    }

    #[test]
    fn weights_above_one_are_rejected() {
        let mut config = LecternConfig::default();
        config.assignment.primary_weight = 1.5;
        let errs = messages(validate_config(&config));
        assert!(errs.iter().any(|m| m.contains("assignment.primary_weight")));
    }

    #[test]
    fn primary_in_secondaries_is_rejected() {
        let mut config = LecternConfig::default();
        config.models[0].secondary_strengths.push("technical".to_string());
        let errs = messages(validate_config(&config));
        assert!(
            errs.iter()
                .any(|m| m.contains("lists its primary strength `technical`"))
        );
    }

    #[test]
    fn collects_every_error() {
        let mut config = LecternConfig::default();
        config.assignment.min_confidence = 1.5;
        config.assignment.max_sections_per_model = 0;
        config.models[1].id = "gpt4".to_string();
        let errs = messages(validate_config(&config));
        assert!(errs.len() >= 3, "got {errs:?}");
        assert!(errs.iter().any(|m| m.contains("duplicate model id `gpt4`")));
    }

    #[test]
    fn empty_roster_is_rejected() {
        let mut config = LecternConfig::default();
        config.models.clear();
        let errs = messages(validate_config(&config));
        assert!(errs.iter().any(|m| m.contains("roster is empty")));
        // analysis_model no longer resolves either
        assert!(errs.iter().any(|m| m.contains("topic.analysis_model")));
    }

    #[test]
    fn strengths_must_be_supported() {
        let mut config = LecternConfig::default();
        config.models[2].supported_sections = vec!["subtextual".to_string()];
        let errs = messages(validate_config(&config));
        assert!(
            errs.iter()
                .any(|m| m.contains("`technical` missing from supported_sections"))
        );
    }

    #[test]
    fn section_must_reference_known_category() {
        let mut config = LecternConfig::default();
        config.sections.insert(
            "recommendations".to_string(),
            crate::model::SectionConfig {
                category: Some("actionable".to_string()),
                token_budget: 1500,
                description: String::new(),
            },
        );
        let errs = messages(validate_config(&config));
        assert!(errs.iter().any(|m| m.contains("unknown indicator category `actionable`")));
    }

    #[test]
    fn embeddings_require_openai() {
        let mut config = LecternConfig::default();
        config.vector_store.embedding_provider = ProviderKind::Gemini;
        let errs = messages(validate_config(&config));
        assert!(errs.iter().any(|m| m.contains("embedding_provider must be `openai`")));
    }

    #[test]
    fn blend_weights_cannot_both_be_zero() {
        let mut config = LecternConfig::default();
        config.assignment.keyword_weight = 0.0;
        let errs = messages(validate_config(&config));
        assert!(errs.iter().any(|m| m.contains("cannot both be zero")));
    }
}
