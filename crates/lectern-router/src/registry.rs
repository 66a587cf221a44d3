// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The model roster and capability tiers.

use std::collections::{BTreeMap, BTreeSet};

use lectern_config::{LecternConfig, ModelConfig};
use lectern_core::LecternError;
use serde::Serialize;
use strum::Display;

/// Strength level at which a model handles a section.
///
/// Variant order is rank order: `Primary` sorts before `Secondary` before `Base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[strum(to_string = "Primary strength")]
    Primary,
    #[strum(to_string = "Secondary strength")]
    Secondary,
    #[strum(to_string = "Base capability")]
    Base,
}

/// Static capability profile of one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCapability {
    pub id: String,
    pub primary_strength: String,
    pub secondary_strengths: Vec<String>,
    pub supported_sections: BTreeSet<String>,
    pub token_limit: u32,
    pub cost_per_token: f64,
}

impl ModelCapability {
    /// Builds a capability, rejecting a primary strength repeated among the secondaries.
    pub fn new(
        id: impl Into<String>,
        primary_strength: impl Into<String>,
        secondary_strengths: Vec<String>,
        supported_sections: impl IntoIterator<Item = String>,
    ) -> Result<Self, LecternError> {
        let id = id.into();
        let primary_strength = primary_strength.into();
        if secondary_strengths.contains(&primary_strength) {
            return Err(LecternError::Config(format!(
                "model `{id}` lists its primary strength `{primary_strength}` as secondary"
            )));
        }
        Ok(Self {
            id,
            primary_strength,
            secondary_strengths,
            supported_sections: supported_sections.into_iter().collect(),
            token_limit: 0,
            cost_per_token: 0.0,
        })
    }

    /// Tier at which this model handles `section`, or `None` if unsupported.
    pub fn tier_for(&self, section: &str) -> Option<Tier> {
        if section == self.primary_strength {
            Some(Tier::Primary)
        } else if self.secondary_strengths.iter().any(|s| s == section) {
            Some(Tier::Secondary)
        } else if self.supported_sections.contains(section) {
            Some(Tier::Base)
        } else {
            None
        }
    }
}

impl TryFrom<&ModelConfig> for ModelCapability {
    type Error = LecternError;

    fn try_from(config: &ModelConfig) -> Result<Self, Self::Error> {
        let mut capability = ModelCapability::new(
            config.id.clone(),
            config.primary_strength.clone(),
            config.secondary_strengths.clone(),
            config.supported_sections.iter().cloned(),
        )?;
        capability.token_limit = config.token_limit;
        capability.cost_per_token = config.cost_per_token;
        Ok(capability)
    }
}

/// Immutable roster keyed by model id.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelCapability>,
}

impl ModelRegistry {
    /// Builds a registry, rejecting duplicate ids.
    pub fn new(models: impl IntoIterator<Item = ModelCapability>) -> Result<Self, LecternError> {
        let mut registry = BTreeMap::new();
        for model in models {
            if registry.contains_key(&model.id) {
                return Err(LecternError::Config(format!(
                    "duplicate model id `{}`",
                    model.id
                )));
            }
            registry.insert(model.id.clone(), model);
        }
        Ok(Self { models: registry })
    }

    pub fn from_config(config: &LecternConfig) -> Result<Self, LecternError> {
        let models = config
            .models
            .iter()
            .map(ModelCapability::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(models)
    }

    pub fn get(&self, id: &str) -> Option<&ModelCapability> {
        self.models.get(id)
    }

    /// Models in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelCapability> {
        self.models.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<String> {
        vec!["technical".into(), "contextual".into(), "subtextual".into()]
    }

    #[test]
    fn tier_priority() {
        let model = ModelCapability::new("gpt4", "technical", vec!["contextual".into()], sections())
            .expect("valid");
        assert_eq!(model.tier_for("technical"), Some(Tier::Primary));
        assert_eq!(model.tier_for("contextual"), Some(Tier::Secondary));
        assert_eq!(model.tier_for("subtextual"), Some(Tier::Base));
        assert_eq!(model.tier_for("recommendations"), None);
    }

    #[test]
    fn tier_names_are_literal() {
        assert_eq!(Tier::Primary.to_string(), "Primary strength");
        assert_eq!(Tier::Secondary.to_string(), "Secondary strength");
        assert_eq!(Tier::Base.to_string(), "Base capability");
        assert!(Tier::Primary < Tier::Secondary && Tier::Secondary < Tier::Base);
    }

    #[test]
    fn primary_cannot_be_secondary() {
        let err = ModelCapability::new("gpt4", "technical", vec!["technical".into()], sections())
            .expect_err("should reject");
        assert!(matches!(err, LecternError::Config(_)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let a = ModelCapability::new("gpt4", "technical", vec![], sections()).expect("valid");
        let err = ModelRegistry::new([a.clone(), a]).expect_err("duplicate");
        assert!(err.to_string().contains("duplicate model id `gpt4`"));
    }

    #[test]
    fn from_default_config() {
        let registry = ModelRegistry::from_config(&LecternConfig::default()).expect("valid");
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["claude", "gemini", "gpt4"]);
        let claude = registry.get("claude").expect("claude");
        assert_eq!(claude.token_limit, 12000);
        assert_eq!(claude.tier_for("subtextual"), Some(Tier::Secondary));
    }
}
