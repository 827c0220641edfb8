//! Single-feature counterfactual alternatives

use super::importance::{Contribution, FeatureImportance};
use super::result::AlternativeOutcome;
use crate::error::Result;
use crate::inference::{Prediction, Predictor};
use std::cmp::Ordering;

/// Nudges each of the most important features against its contribution and
/// re-predicts.
///
/// Positive contributors move down by `step` (floored at 0), all others move
/// up (capped at 1). This is a local approximation of "what single change
/// would most plausibly alter the outcome", not a search for the nearest
/// decision boundary.
#[derive(Debug, Clone)]
pub struct CounterfactualGenerator {
    step: f64,
    /// Number of top features perturbed
    n_features: usize,
    max_alternatives: usize,
}

impl Default for CounterfactualGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterfactualGenerator {
    pub fn new() -> Self {
        Self {
            step: 0.2,
            n_features: 3,
            max_alternatives: 3,
        }
    }

    /// Set the perturbation step
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Set the maximum number of alternatives returned
    pub fn with_max_alternatives(mut self, n: usize) -> Self {
        self.max_alternatives = n;
        self
    }

    /// Build ranked alternatives for one explained instance.
    ///
    /// Features already at the bound they would move towards produce no
    /// alternative.
    pub fn generate(
        &self,
        predictor: &Predictor<'_>,
        input: &[f64],
        original: &Prediction,
        ranked: &[FeatureImportance],
    ) -> Result<Vec<AlternativeOutcome>> {
        let mut edits = Vec::new();
        let mut modified = Vec::new();

        for feature in ranked.iter().take(self.n_features) {
            let idx = feature.feature_index;
            let old = input[idx];
            let new = match feature.contribution {
                Contribution::Positive => (old - self.step).max(0.0),
                Contribution::Negative | Contribution::Neutral => (old + self.step).min(1.0),
            };
            if new == old {
                continue;
            }

            let mut x = input.to_vec();
            x[idx] = new;
            modified.push(x);
            edits.push(format!("Change {} from {:.3} to {:.3}", feature.feature, old, new));
        }

        let predictions = predictor.predict_many(&modified)?;

        let mut alternatives: Vec<AlternativeOutcome> = predictions
            .into_iter()
            .zip(edits)
            .map(|(prediction, edit)| AlternativeOutcome {
                outcome: prediction.outcome(),
                probability: prediction.plausibility_against(original).clamp(0.0, 1.0),
                required_changes: vec![edit],
            })
            .collect();

        alternatives.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(Ordering::Equal)
        });
        alternatives.truncate(self.max_alternatives);

        Ok(alternatives)
    }
}
