//! Typed predictions built from raw model output

use crate::error::{ExplainError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of model being explained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Output is a vector of class probabilities
    Classification,
    /// Output position 0 holds a scalar
    Regression,
}

/// Anything that reports a scalar score and a confidence.
///
/// Attribution measures changes in `score`; counterfactuals and validation
/// read `confidence`.
pub trait Scorable {
    /// Quantity whose change attribution measures
    fn score(&self) -> f64;
    /// Confidence in `[0, 1]`
    fn confidence(&self) -> f64;
}

/// The class-or-value of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Class(usize),
    Value(f64),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Class(c) => write!(f, "class {}", c),
            Outcome::Value(v) => write!(f, "{:.4}", v),
        }
    }
}

/// Normalized model prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task_type", rename_all = "lowercase")]
pub enum Prediction {
    Classification {
        class_index: usize,
        probabilities: Vec<f64>,
        confidence: f64,
    },
    Regression {
        value: f64,
        confidence: f64,
    },
}

/// Heuristic confidence for a regression output.
///
/// `clamp(1 - |value| / 10, 0.1, 0.99)`; a coarse magnitude rule, not a
/// calibrated uncertainty estimate.
pub fn regression_confidence(value: f64) -> f64 {
    (1.0 - value.abs() / 10.0).clamp(0.1, 0.99)
}

impl Prediction {
    /// Normalize a raw output vector.
    ///
    /// Classification outputs are taken as already-normalized probabilities.
    pub fn from_output(output: &[f64], task: TaskType) -> Result<Self> {
        if output.is_empty() {
            return Err(ExplainError::InferenceError(
                "model returned an empty output vector".to_string(),
            ));
        }
        if let Some(pos) = output.iter().position(|v| !v.is_finite()) {
            return Err(ExplainError::InferenceError(format!(
                "model output contains non-finite value {} at position {}",
                output[pos], pos
            )));
        }

        match task {
            TaskType::Classification => {
                let (class_index, max) = output.iter().copied().enumerate().fold(
                    (0, f64::NEG_INFINITY),
                    |(best_idx, best), (idx, v)| {
                        if v > best {
                            (idx, v)
                        } else {
                            (best_idx, best)
                        }
                    },
                );
                Ok(Prediction::Classification {
                    class_index,
                    probabilities: output.to_vec(),
                    confidence: max.clamp(0.0, 1.0),
                })
            }
            TaskType::Regression => {
                let value = output[0];
                Ok(Prediction::Regression {
                    value,
                    confidence: regression_confidence(value),
                })
            }
        }
    }

    pub fn task_type(&self) -> TaskType {
        match self {
            Prediction::Classification { .. } => TaskType::Classification,
            Prediction::Regression { .. } => TaskType::Regression,
        }
    }

    /// Predicted class or value
    pub fn outcome(&self) -> Outcome {
        match self {
            Prediction::Classification { class_index, .. } => Outcome::Class(*class_index),
            Prediction::Regression { value, .. } => Outcome::Value(*value),
        }
    }

    pub fn class_index(&self) -> Option<usize> {
        match self {
            Prediction::Classification { class_index, .. } => Some(*class_index),
            Prediction::Regression { .. } => None,
        }
    }

    pub fn probabilities(&self) -> Option<&[f64]> {
        match self {
            Prediction::Classification { probabilities, .. } => Some(probabilities),
            Prediction::Regression { .. } => None,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Prediction::Regression { value, .. } => Some(*value),
            Prediction::Classification { .. } => None,
        }
    }

    /// How plausible this prediction is as an alternative to `original`.
    ///
    /// Classification: this prediction's confidence. Regression: similarity
    /// `max(0, 1 - |Δvalue|)`.
    pub fn plausibility_against(&self, original: &Prediction) -> f64 {
        match self {
            Prediction::Classification { confidence, .. } => *confidence,
            Prediction::Regression { value, .. } => {
                (1.0 - (value - original.score()).abs()).max(0.0)
            }
        }
    }
}

impl Scorable for Prediction {
    fn score(&self) -> f64 {
        match self {
            Prediction::Classification { confidence, .. } => *confidence,
            Prediction::Regression { value, .. } => *value,
        }
    }

    fn confidence(&self) -> f64 {
        match self {
            Prediction::Classification { confidence, .. } => *confidence,
            Prediction::Regression { confidence, .. } => *confidence,
        }
    }
}
