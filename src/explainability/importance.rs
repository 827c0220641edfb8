//! Ranked feature importance

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Direction in which a feature moved the prediction score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Contribution {
    Positive,
    Negative,
    Neutral,
}

impl Contribution {
    /// Classify a signed effect; exactly zero is neutral
    pub fn from_effect(effect: f64) -> Self {
        if effect > 0.0 {
            Contribution::Positive
        } else if effect < 0.0 {
            Contribution::Negative
        } else {
            Contribution::Neutral
        }
    }

    /// `1`, `-1` or `0`
    pub fn sign(&self) -> f64 {
        match self {
            Contribution::Positive => 1.0,
            Contribution::Negative => -1.0,
            Contribution::Neutral => 0.0,
        }
    }
}

/// Influence of one input feature on one prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Feature name
    pub feature: String,
    /// Position of the feature in the input vector
    pub feature_index: usize,
    /// Magnitude of the effect, always >= 0
    pub importance: f64,
    /// Sign of the effect
    pub contribution: Contribution,
    /// Feature value for this instance
    pub value: f64,
}

impl FeatureImportance {
    /// Build from a signed effect
    pub fn from_effect(
        feature: impl Into<String>,
        feature_index: usize,
        effect: f64,
        value: f64,
    ) -> Self {
        Self {
            feature: feature.into(),
            feature_index,
            importance: effect.abs(),
            contribution: Contribution::from_effect(effect),
            value,
        }
    }

    /// The effect with its sign restored
    pub fn signed_effect(&self) -> f64 {
        self.importance * self.contribution.sign()
    }
}

/// Sort by importance, descending. Ties keep their input order.
pub fn rank_importances(mut importances: Vec<FeatureImportance>) -> Vec<FeatureImportance> {
    importances.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(Ordering::Equal)
    });
    importances
}

/// Whether a list is non-increasing in importance
pub fn is_ranked(importances: &[FeatureImportance]) -> bool {
    importances
        .windows(2)
        .all(|w| w[0].importance >= w[1].importance)
}

/// Sum of the `k` largest importances of a ranked list
pub fn top_k_sum(importances: &[FeatureImportance], k: usize) -> f64 {
    importances.iter().take(k).map(|f| f.importance).sum()
}
