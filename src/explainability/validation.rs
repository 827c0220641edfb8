//! Scoring produced explanations against ground truth

use super::result::ExplainableResult;
use crate::error::{ExplainError, Result};
use crate::inference::{Outcome, Prediction};
use serde::{Deserialize, Serialize};

/// Per-explanation scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub index: usize,
    pub consistency: f64,
    pub accuracy: f64,
}

/// Aggregate validation outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub overall_consistency: f64,
    pub overall_accuracy: f64,
    pub validation_results: Vec<ValidationResult>,
    pub recommendations: Vec<String>,
}

/// Regression-tests the engine's own output.
///
/// Consistency is `max(0, 1 - |Σ top-k importances - 1|)`. This is a sanity
/// heuristic only: Shapley values sum to the prediction minus the baseline,
/// not to one, and permutation or LIME magnitudes obey no such law.
#[derive(Debug, Clone)]
pub struct ExplanationValidator {
    /// Importances summed for the consistency check
    top_k: usize,
    min_consistency: f64,
    min_accuracy: f64,
    production_threshold: f64,
}

impl Default for ExplanationValidator {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_consistency: 0.7,
            min_accuracy: 0.8,
            production_threshold: 0.9,
        }
    }
}

impl ExplanationValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistency heuristic for one explanation
    pub fn consistency(&self, explanation: &ExplainableResult) -> f64 {
        (1.0 - (explanation.importance_sum(self.top_k) - 1.0).abs()).max(0.0)
    }

    /// Accuracy of one prediction against its expected outcome
    pub fn accuracy(&self, prediction: &Prediction, expected: &Outcome) -> Result<f64> {
        match (prediction.outcome(), expected) {
            (Outcome::Class(predicted), Outcome::Class(expected)) => {
                Ok(if predicted == *expected { 1.0 } else { 0.0 })
            }
            (Outcome::Value(predicted), Outcome::Value(expected)) => {
                Ok((1.0 - (predicted - expected).abs()).max(0.0))
            }
            (predicted, expected) => Err(ExplainError::InvalidInput(format!(
                "expected outcome {:?} does not match prediction kind {:?}",
                expected, predicted
            ))),
        }
    }

    /// Score a batch of explanations
    pub fn validate(
        &self,
        explanations: &[ExplainableResult],
        test_inputs: &[Vec<f64>],
        expected_outputs: &[Outcome],
    ) -> Result<ValidationReport> {
        if explanations.is_empty() {
            return Err(ExplainError::InvalidInput(
                "no explanations to validate".to_string(),
            ));
        }
        if explanations.len() != test_inputs.len() || explanations.len() != expected_outputs.len()
        {
            return Err(ExplainError::InvalidInput(format!(
                "length mismatch: {} explanations, {} inputs, {} expected outputs",
                explanations.len(),
                test_inputs.len(),
                expected_outputs.len()
            )));
        }

        let validation_results = explanations
            .iter()
            .zip(expected_outputs)
            .enumerate()
            .map(|(index, (explanation, expected))| {
                Ok(ValidationResult {
                    index,
                    consistency: self.consistency(explanation),
                    accuracy: self.accuracy(&explanation.prediction, expected)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let n = validation_results.len() as f64;
        let overall_consistency = validation_results.iter().map(|r| r.consistency).sum::<f64>() / n;
        let overall_accuracy = validation_results.iter().map(|r| r.accuracy).sum::<f64>() / n;

        let recommendations = self.recommendations(overall_consistency, overall_accuracy);

        Ok(ValidationReport {
            overall_consistency,
            overall_accuracy,
            validation_results,
            recommendations,
        })
    }

    fn recommendations(&self, consistency: f64, accuracy: f64) -> Vec<String> {
        let mut recommendations = Vec::new();

        if consistency < self.min_consistency {
            recommendations.push(
                "Explanation consistency is low: use a more stable attribution method (more SHAP samples) or ensemble several explanations"
                    .to_string(),
            );
        }
        if accuracy < self.min_accuracy {
            recommendations.push(
                "Prediction accuracy is low: review the model and its training data".to_string(),
            );
        }
        if consistency > self.production_threshold && accuracy > self.production_threshold {
            recommendations.push(
                "Explanations are consistent and accurate: ready for production".to_string(),
            );
        }

        recommendations
    }
}
