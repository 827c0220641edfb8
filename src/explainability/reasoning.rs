//! Natural-language rationale for a prediction

use super::importance::{Contribution, FeatureImportance};
use crate::inference::Prediction;

/// Describe a prediction and the features behind it in one paragraph.
///
/// Only the first `max_features` entries of the ranked list are considered;
/// neutral features are not mentioned.
pub fn synthesize_reasoning(
    features: &[FeatureImportance],
    prediction: &Prediction,
    max_features: usize,
) -> String {
    let mut text = match prediction {
        Prediction::Classification {
            class_index,
            confidence,
            ..
        } => format!(
            "The model predicts class {} with {:.1}% confidence.",
            class_index,
            confidence * 100.0
        ),
        Prediction::Regression { value, .. } => {
            format!("The model predicts a value of {:.4}.", value)
        }
    };

    let top = &features[..max_features.min(features.len())];
    let positive = describe(top, Contribution::Positive);
    let negative = describe(top, Contribution::Negative);

    if positive.is_empty() && negative.is_empty() {
        text.push_str(" No single feature had a measurable influence on this prediction.");
        return text;
    }
    if !positive.is_empty() {
        text.push_str(&format!(" Factors supporting this prediction: {}.", positive));
    }
    if !negative.is_empty() {
        text.push_str(&format!(" Factors working against it: {}.", negative));
    }
    text
}

fn describe(features: &[FeatureImportance], contribution: Contribution) -> String {
    features
        .iter()
        .filter(|f| f.contribution == contribution)
        .map(|f| format!("{} ({:.3})", f.feature, f.value))
        .collect::<Vec<_>>()
        .join(", ")
}
