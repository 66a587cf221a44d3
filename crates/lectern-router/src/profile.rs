// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-category content scores.

use std::collections::BTreeMap;

use lectern_core::LecternError;
use serde::Serialize;

/// Mapping from category name to a score in [0, 1].
///
/// Immutable once built. Categories absent from the map score zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContentProfile {
    scores: BTreeMap<String, f64>,
}

impl ContentProfile {
    /// Builds a profile from untrusted scores, rejecting anything outside [0, 1].
    pub fn new(scores: BTreeMap<String, f64>) -> Result<Self, LecternError> {
        for (category, score) in &scores {
            if !score.is_finite() || !(0.0..=1.0).contains(score) {
                return Err(LecternError::Validation(format!(
                    "content profile score for `{category}` must be in [0, 1], got {score}"
                )));
            }
        }
        Ok(Self { scores })
    }

    /// Caller guarantees every score is already in [0, 1].
    pub(crate) fn from_clamped(scores: BTreeMap<String, f64>) -> Self {
        debug_assert!(scores.values().all(|s| (0.0..=1.0).contains(s)));
        Self { scores }
    }

    pub fn score(&self, category: &str) -> f64 {
        self.scores.get(category).copied().unwrap_or(0.0)
    }

    pub fn scores(&self) -> &BTreeMap<String, f64> {
        &self.scores
    }

    /// Highest-scoring category; ties go to the lexically first name.
    pub fn dominant(&self) -> Option<(&str, f64)> {
        self.scores
            .iter()
            .fold(None, |best: Option<(&str, f64)>, (name, &score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((name.as_str(), score)),
            })
    }

    /// Weighted mean of two profiles over the union of their categories.
    ///
    /// `own_weight` applies to `self`, `other_weight` to `other`.
    pub fn blend(
        &self,
        other: &ContentProfile,
        own_weight: f64,
        other_weight: f64,
    ) -> Result<ContentProfile, LecternError> {
        let total = own_weight + other_weight;
        let usable = |w: f64| w.is_finite() && w >= 0.0;
        if !(usable(own_weight) && usable(other_weight) && total > 0.0) {
            return Err(LecternError::Validation(format!(
                "blend weights must be finite and non-negative with a positive sum, got {own_weight} / {other_weight}"
            )));
        }
        let blended = self
            .scores
            .keys()
            .chain(other.scores.keys())
            .map(|category| {
                let mixed = (own_weight * self.score(category)
                    + other_weight * other.score(category))
                    / total;
                (category.clone(), mixed.clamp(0.0, 1.0))
            })
            .collect();
        Ok(Self::from_clamped(blended))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(pairs: &[(&str, f64)]) -> ContentProfile {
        ContentProfile::new(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
            .expect("valid profile")
    }

    #[test]
    fn rejects_out_of_range_scores() {
        let bad = BTreeMap::from([("technical".to_string(), 1.2)]);
        assert!(matches!(
            ContentProfile::new(bad),
            Err(LecternError::Validation(_))
        ));
        let nan = BTreeMap::from([("technical".to_string(), f64::NAN)]);
        assert!(ContentProfile::new(nan).is_err());
    }

    #[test]
    fn missing_category_scores_zero() {
        let p = profile(&[("technical", 0.4)]);
        assert_eq!(p.score("technical"), 0.4);
        assert_eq!(p.score("subtextual"), 0.0);
    }

    #[test]
    fn dominant_prefers_first_name_on_tie() {
        let p = profile(&[("contextual", 0.8), ("subtextual", 0.8), ("technical", 0.6)]);
        assert_eq!(p.dominant(), Some(("contextual", 0.8)));
        assert_eq!(ContentProfile::default().dominant(), None);
    }

    #[test]
    fn blend_is_weighted_mean_over_union() {
        let keyword = profile(&[("technical", 1.0), ("contextual", 0.0)]);
        let semantic = profile(&[("technical", 0.5), ("subtextual", 1.0)]);
        let blended = keyword.blend(&semantic, 0.6, 0.4).expect("blend");
        assert!((blended.score("technical") - 0.8).abs() < 1e-9);
        assert!((blended.score("subtextual") - 0.4).abs() < 1e-9);
        assert_eq!(blended.score("contextual"), 0.0);
        assert_eq!(blended.scores().len(), 3);
    }

    #[test]
    fn blend_rejects_zero_weights() {
        let p = profile(&[("technical", 1.0)]);
        assert!(p.blend(&p, 0.0, 0.0).is_err());
    }

    #[test]
    fn blend_rejects_non_finite_weights() {
        let p = profile(&[("technical", 1.0)]);
        for (own, other) in [
            (f64::NAN, 0.0),
            (1.0, f64::NAN),
            (f64::INFINITY, 0.0),
            (1.0, f64::INFINITY),
            (f64::NEG_INFINITY, 1.0),
        ] {
            assert!(
                matches!(p.blend(&p, own, other), Err(LecternError::Validation(_))),
                "accepted {own} / {other}"
            );
        }
    }
}
