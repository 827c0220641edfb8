//! Explanation results returned to callers

use super::config::AttributionMethod;
use super::importance::{top_k_sum, Contribution, FeatureImportance};
use crate::error::Result;
use crate::inference::{Outcome, Prediction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A nearby input that plausibly leads to another outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeOutcome {
    /// Class or value predicted for the modified input
    pub outcome: Outcome,
    /// Plausibility in `[0, 1]`
    pub probability: f64,
    /// Human-readable edits that produce this outcome
    pub required_changes: Vec<String>,
}

/// Why the model predicted what it did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// All features, ranked by importance
    pub features: Vec<FeatureImportance>,
    pub reasoning: String,
    /// Ranked by probability, at most the configured number
    pub alternative_outcomes: Vec<AlternativeOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationMetadata {
    pub model_version: String,
    pub method: AttributionMethod,
    pub timestamp: DateTime<Utc>,
    pub processing_time_ms: f64,
    /// Inference port calls made for this explanation
    pub inference_count: usize,
}

/// A prediction together with its explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainableResult {
    pub prediction: Prediction,
    pub confidence: f64,
    pub explanation: Explanation,
    pub metadata: ExplanationMetadata,
}

impl ExplainableResult {
    /// Top `k` features by importance
    pub fn top_features(&self, k: usize) -> &[FeatureImportance] {
        let end = k.min(self.explanation.features.len());
        &self.explanation.features[..end]
    }

    /// Sum of the `k` largest importances
    pub fn importance_sum(&self, k: usize) -> f64 {
        top_k_sum(&self.explanation.features, k)
    }

    /// Features that pushed the score up
    pub fn positive_contributors(&self) -> Vec<&FeatureImportance> {
        self.explanation
            .features
            .iter()
            .filter(|f| f.contribution == Contribution::Positive)
            .collect()
    }

    /// Features that pushed the score down
    pub fn negative_contributors(&self) -> Vec<&FeatureImportance> {
        self.explanation
            .features
            .iter()
            .filter(|f| f.contribution == Contribution::Negative)
            .collect()
    }

    /// Serialize for a hosting service
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::TaskType;

    fn sample_result() -> ExplainableResult {
        let prediction = Prediction::from_output(&[0.2, 0.8], TaskType::Classification).unwrap();
        ExplainableResult {
            confidence: 0.8,
            prediction,
            explanation: Explanation {
                features: vec![
                    FeatureImportance::from_effect("income", 0, 0.5, 0.7),
                    FeatureImportance::from_effect("debt", 1, -0.3, 0.4),
                    FeatureImportance::from_effect("zip", 2, 0.0, 0.1),
                ],
                reasoning: "test".to_string(),
                alternative_outcomes: vec![],
            },
            metadata: ExplanationMetadata {
                model_version: "v1".to_string(),
                method: AttributionMethod::Permutation,
                timestamp: Utc::now(),
                processing_time_ms: 1.0,
                inference_count: 4,
            },
        }
    }

    #[test]
    fn test_accessors() {
        let result = sample_result();
        assert_eq!(result.top_features(2).len(), 2);
        assert_eq!(result.top_features(10).len(), 3);
        assert!((result.importance_sum(5) - 0.8).abs() < 1e-12);
        assert_eq!(result.positive_contributors().len(), 1);
        assert_eq!(result.negative_contributors()[0].feature, "debt");
    }

    #[test]
    fn test_to_json() {
        let json = sample_result().to_json().unwrap();
        assert!(json.contains("\"method\":\"permutation\""));
        assert!(json.contains("\"contribution\":\"negative\""));
        let back: ExplainableResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.explanation.features.len(), 3);
    }
}
