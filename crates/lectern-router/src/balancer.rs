// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, load-aware assignment of sections to models.
//!
//! The balancer runs a greedy pass and then a fairness pass.
//!
//! 1. Greedy. Each round re-scores every remaining candidate against its
//!    model's current load and accepts the single best one. A candidate that
//!    falls below the floor, or whose model is full, drops out.
//! 2. Fairness. Any model that had an above-floor candidate but received
//!    nothing is given its best candidate. If the global budget is spent, a
//!    slot is freed by evicting the weakest non-top assignment from a model
//!    holding more than one.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use lectern_config::AssignmentConfig;
use lectern_core::LecternError;
use serde::Serialize;
use tracing::{debug, warn};

use crate::profile::ContentProfile;
use crate::registry::{ModelCapability, ModelRegistry, Tier};
use crate::scorer::{ConfidenceScorer, ScoredCandidate};

/// A section assigned to a model, with its confidence and justification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    /// Carried for ranking; the plan is already keyed by model id.
    #[serde(skip)]
    pub model_id: String,
    pub section_type: String,
    pub confidence_score: f64,
    pub reasoning: String,
    pub tier: Tier,
}

impl Assignment {
    fn new(model_id: &str, section: &str, scored: ScoredCandidate) -> Self {
        Self {
            model_id: model_id.to_string(),
            section_type: section.to_string(),
            confidence_score: scored.confidence,
            reasoning: scored.reasoning,
            tier: scored.tier,
        }
    }
}

/// Ranking used everywhere assignments are ordered: confidence descending,
/// then tier, then model id, then section name.
pub fn rank(a: &Assignment, b: &Assignment) -> Ordering {
    b.confidence_score
        .total_cmp(&a.confidence_score)
        .then(a.tier.cmp(&b.tier))
        .then_with(|| a.model_id.cmp(&b.model_id))
        .then_with(|| a.section_type.cmp(&b.section_type))
}

/// Result of balancing: every roster model mapped to its assignments, best first.
///
/// Serializes as `{"model_id": [{section_type, confidence_score, reasoning, tier}, ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AssignmentPlan {
    assignments: BTreeMap<String, Vec<Assignment>>,
}

impl AssignmentPlan {
    /// Assignments for `model_id`; empty for unknown or unassigned models.
    pub fn get(&self, model_id: &str) -> &[Assignment] {
        self.assignments
            .get(model_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `(model_id, assignments)` in model id order, including empty entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Assignment])> {
        self.assignments
            .iter()
            .map(|(id, list)| (id.as_str(), list.as_slice()))
    }

    /// Every assignment, grouped by model in id order.
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values().flatten()
    }

    pub fn total(&self) -> usize {
        self.assignments.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<Assignment>> {
        self.assignments
    }
}

/// Assigns sections to models under a confidence floor and capacity limits.
#[derive(Debug, Clone)]
pub struct AssignmentBalancer {
    config: AssignmentConfig,
    scorer: ConfidenceScorer,
}

impl AssignmentBalancer {
    pub fn new(config: AssignmentConfig, scorer: ConfidenceScorer) -> Self {
        Self { config, scorer }
    }

    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    pub fn scorer(&self) -> &ConfidenceScorer {
        &self.scorer
    }

    /// Balances every supported (model, section) pair in `registry` against `profile`.
    ///
    /// Returns [`LecternError::Validation`] for an empty roster and
    /// [`LecternError::NoViableAssignment`] when no candidate reaches the floor.
    pub fn assign(
        &self,
        registry: &ModelRegistry,
        profile: &ContentProfile,
    ) -> Result<AssignmentPlan, LecternError> {
        if registry.is_empty() {
            return Err(LecternError::Validation(
                "cannot assign sections with an empty model roster".to_string(),
            ));
        }

        let floor = self.config.min_confidence;
        let cap = self.config.max_sections_per_model;
        let budget = self.config.max_total_sections.unwrap_or(usize::MAX);

        let mut candidates = 0;
        let mut pending: Vec<(&ModelCapability, &str)> = Vec::new();
        for model in registry.iter() {
            for section in &model.supported_sections {
                candidates += 1;
                let scored = self.scorer.score(model, section, profile, 0)?;
                debug!(
                    model = %model.id,
                    section = %section,
                    tier = %scored.tier,
                    confidence = scored.confidence,
                    "scored candidate"
                );
                if scored.confidence >= floor {
                    pending.push((model, section.as_str()));
                }
            }
        }

        if pending.is_empty() {
            return Err(LecternError::NoViableAssignment { candidates, floor });
        }

        let viable: BTreeSet<&str> = pending.iter().map(|&(m, _)| m.id.as_str()).collect();
        let mut accepted: BTreeMap<String, Vec<Assignment>> = registry
            .ids()
            .map(|id| (id.to_string(), Vec::new()))
            .collect();
        let mut total = 0;

        while total < budget {
            let mut round = Vec::with_capacity(pending.len());
            for (model, section) in pending {
                let load = accepted.get(&model.id).map_or(0, Vec::len);
                if load >= cap {
                    continue;
                }
                let scored = self.scorer.score(model, section, profile, load)?;
                if scored.confidence >= floor {
                    round.push(((model, section), Assignment::new(&model.id, section, scored)));
                }
            }

            let Some(best) = round
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| rank(&a.1, &b.1))
                .map(|(i, _)| i)
            else {
                break;
            };

            let (_, chosen) = round.swap_remove(best);
            debug!(
                model = %chosen.model_id,
                section = %chosen.section_type,
                confidence = chosen.confidence_score,
                "assignment accepted"
            );
            if let Some(list) = accepted.get_mut(&chosen.model_id) {
                list.push(chosen);
            }
            total += 1;
            pending = round.into_iter().map(|(key, _)| key).collect();
        }

        for model_id in viable {
            if accepted.get(model_id).is_some_and(|list| !list.is_empty()) {
                continue;
            }
            let Some(model) = registry.get(model_id) else {
                continue;
            };
            let Some(candidate) = self.best_fresh_candidate(model, profile)? else {
                continue;
            };

            if total >= budget && !evict_weakest(&mut accepted) {
                warn!(
                    model = %model_id,
                    "fairness pass found no evictable assignment; model left without sections"
                );
                continue;
            }
            if total < budget {
                total += 1;
            }

            debug!(
                model = %model_id,
                section = %candidate.section_type,
                confidence = candidate.confidence_score,
                "fairness pass assigned starved model"
            );
            if let Some(list) = accepted.get_mut(model_id) {
                list.push(candidate);
            }
        }

        for list in accepted.values_mut() {
            list.sort_by(rank);
        }

        Ok(AssignmentPlan {
            assignments: accepted,
        })
    }

    /// Best above-floor candidate for a model holding no assignments.
    fn best_fresh_candidate(
        &self,
        model: &ModelCapability,
        profile: &ContentProfile,
    ) -> Result<Option<Assignment>, LecternError> {
        let mut best: Option<Assignment> = None;
        for section in &model.supported_sections {
            let scored = self.scorer.score(model, section, profile, 0)?;
            if scored.confidence < self.config.min_confidence {
                continue;
            }
            let candidate = Assignment::new(&model.id, section, scored);
            let better = best
                .as_ref()
                .is_none_or(|current| rank(&candidate, current) == Ordering::Less);
            if better {
                best = Some(candidate);
            }
        }
        Ok(best)
    }
}

/// Removes the lowest-ranked assignment that is not its model's top entry,
/// from models holding more than one. Returns false if nothing is evictable.
fn evict_weakest(accepted: &mut BTreeMap<String, Vec<Assignment>>) -> bool {
    let mut weakest: Option<(&str, usize, &Assignment)> = None;
    for (model_id, list) in accepted.iter() {
        if list.len() < 2 {
            continue;
        }
        let top = list
            .iter()
            .enumerate()
            .min_by(|a, b| rank(a.1, b.1))
            .map(|(i, _)| i);
        for (i, assignment) in list.iter().enumerate() {
            if Some(i) == top {
                continue;
            }
            let weaker = weakest
                .as_ref()
                .is_none_or(|(_, _, current)| rank(assignment, current) == Ordering::Greater);
            if weaker {
                weakest = Some((model_id.as_str(), i, assignment));
            }
        }
    }

    let Some((model_id, index, _)) = weakest else {
        return false;
    };
    let model_id = model_id.to_string();
    if let Some(list) = accepted.get_mut(&model_id) {
        let evicted = list.remove(index);
        debug!(
            model = %model_id,
            section = %evicted.section_type,
            "evicted assignment to make room in fairness pass"
        );
    }
    true
}
