//! Global model behavior from many local attributions

use super::importance::FeatureImportance;
use crate::error::{ExplainError, Result};
use crate::inference::ModelArchitecture;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of features reported in the global ranking
pub const GLOBAL_TOP_K: usize = 10;

/// Features averaging below this importance count as negligible
pub const NEGLIGIBLE_IMPORTANCE: f64 = 0.01;

const SCORE_EPSILON: f64 = 1e-10;

/// Coarse size tier of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// Tier from parameter and layer counts.
    ///
    /// Models that do not report an architecture are treated as `Medium`.
    pub fn classify(architecture: Option<ModelArchitecture>) -> Self {
        match architecture {
            Some(arch) if arch.parameter_count < 1_000 && arch.layer_count < 5 => {
                Complexity::Low
            }
            Some(arch) if arch.parameter_count < 100_000 && arch.layer_count < 10 => {
                Complexity::Medium
            }
            Some(_) => Complexity::High,
            None => Complexity::Medium,
        }
    }
}

/// Global behavioral report over a batch of inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBehaviorReport {
    /// Top features by mean importance
    pub global_feature_importance: Vec<(String, f64)>,
    pub complexity: Complexity,
    /// How concentrated importance is, in `[0, 1]`
    pub interpretability_score: f64,
    pub recommendations: Vec<String>,
    /// Inputs the report was built from
    pub n_instances: usize,
}

/// `min(1, max / (mean + ε) / 10)`: high when a few features dominate
pub fn interpretability_score(mean_importances: &[f64]) -> f64 {
    if mean_importances.is_empty() {
        return 0.0;
    }
    let max = mean_importances.iter().copied().fold(0.0_f64, f64::max);
    let mean = mean_importances.iter().sum::<f64>() / mean_importances.len() as f64;
    (max / (mean + SCORE_EPSILON) / 10.0).min(1.0)
}

/// Sums per-feature importance over explained instances
#[derive(Debug, Clone)]
pub struct GlobalImportanceAccumulator {
    feature_names: Vec<String>,
    sums: Vec<f64>,
    n_instances: usize,
}

impl GlobalImportanceAccumulator {
    pub fn new(feature_names: &[String]) -> Self {
        Self {
            feature_names: feature_names.to_vec(),
            sums: vec![0.0; feature_names.len()],
            n_instances: 0,
        }
    }

    /// Add the attribution of one instance
    pub fn add(&mut self, importances: &[FeatureImportance]) -> Result<()> {
        for f in importances {
            let slot = self.sums.get_mut(f.feature_index).ok_or_else(|| {
                ExplainError::ShapeError {
                    expected: format!("feature index < {}", self.feature_names.len()),
                    actual: f.feature_index.to_string(),
                }
            })?;
            *slot += f.importance;
        }
        self.n_instances += 1;
        Ok(())
    }

    pub fn n_instances(&self) -> usize {
        self.n_instances
    }

    /// Mean importance per feature, in input order
    pub fn mean_importances(&self) -> Vec<f64> {
        let n = self.n_instances.max(1) as f64;
        self.sums.iter().map(|s| s / n).collect()
    }

    /// Build the report
    pub fn finish(self, architecture: Option<ModelArchitecture>) -> Result<ModelBehaviorReport> {
        if self.n_instances == 0 {
            return Err(ExplainError::InvalidInput(
                "behavior analysis needs at least one input".to_string(),
            ));
        }

        let means = self.mean_importances();

        let mut ranked: Vec<(String, f64)> = self
            .feature_names
            .iter()
            .cloned()
            .zip(means.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(GLOBAL_TOP_K);

        let complexity = Complexity::classify(architecture);
        let score = interpretability_score(&means);
        let recommendations = behavior_recommendations(complexity, &means, score);

        Ok(ModelBehaviorReport {
            global_feature_importance: ranked,
            complexity,
            interpretability_score: score,
            recommendations,
            n_instances: self.n_instances,
        })
    }
}

/// Threshold rules over the aggregated behavior
pub fn behavior_recommendations(
    complexity: Complexity,
    mean_importances: &[f64],
    score: f64,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if complexity == Complexity::High {
        recommendations.push(
            "Model complexity is high: consider simplifying the architecture or adding regularization"
                .to_string(),
        );
    }

    let negligible = mean_importances
        .iter()
        .filter(|&&m| m < NEGLIGIBLE_IMPORTANCE)
        .count();
    if !mean_importances.is_empty() && negligible * 2 > mean_importances.len() {
        recommendations.push(format!(
            "{} of {} features have negligible importance: consider feature selection",
            negligible,
            mean_importances.len()
        ));
    }

    if score < 0.3 {
        recommendations.push(
            "Feature importance is diffuse: consider a simpler model or additional explainability tooling"
                .to_string(),
        );
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_complexity_tiers() {
        let arch = |p, l| Some(ModelArchitecture::new(p, l));
        assert_eq!(Complexity::classify(arch(999, 4)), Complexity::Low);
        assert_eq!(Complexity::classify(arch(999, 5)), Complexity::Medium);
        assert_eq!(Complexity::classify(arch(50_000, 9)), Complexity::Medium);
        assert_eq!(Complexity::classify(arch(100_000, 2)), Complexity::High);
        assert_eq!(Complexity::classify(arch(10, 12)), Complexity::High);
        assert_eq!(Complexity::classify(None), Complexity::Medium);
    }

    #[test]
    fn test_interpretability_score() {
        // One dominant feature out of ten: max / mean = 10
        let mut concentrated = vec![0.0; 10];
        concentrated[0] = 1.0;
        assert!((interpretability_score(&concentrated) - 1.0).abs() < 1e-6);

        // Uniform importance: max / mean = 1
        let uniform = vec![0.2; 5];
        assert!((interpretability_score(&uniform) - 0.1).abs() < 1e-6);

        assert_eq!(interpretability_score(&[0.0, 0.0]), 0.0);
        assert_eq!(interpretability_score(&[]), 0.0);
    }

    #[test]
    fn test_accumulator_report() {
        let mut acc = GlobalImportanceAccumulator::new(&names(3));
        acc.add(&[
            FeatureImportance::from_effect("f0", 0, 0.6, 0.0),
            FeatureImportance::from_effect("f1", 1, 0.0, 0.0),
            FeatureImportance::from_effect("f2", 2, -0.2, 0.0),
        ])
        .unwrap();
        acc.add(&[
            FeatureImportance::from_effect("f2", 2, 0.4, 0.0),
            FeatureImportance::from_effect("f0", 0, 0.2, 0.0),
            FeatureImportance::from_effect("f1", 1, 0.0, 0.0),
        ])
        .unwrap();

        let report = acc.finish(Some(ModelArchitecture::new(200_000, 3))).unwrap();
        assert_eq!(report.n_instances, 2);
        assert_eq!(report.global_feature_importance[0].0, "f0");
        assert!((report.global_feature_importance[0].1 - 0.4).abs() < 1e-12);
        assert_eq!(report.global_feature_importance[1].0, "f2");
        assert_eq!(report.complexity, Complexity::High);
        assert!(report.recommendations[0].contains("regularization"));
    }

    #[test]
    fn test_top_k_truncation() {
        let mut acc = GlobalImportanceAccumulator::new(&names(15));
        let row: Vec<FeatureImportance> = (0..15)
            .map(|i| FeatureImportance::from_effect(format!("f{}", i), i, i as f64, 0.0))
            .collect();
        acc.add(&row).unwrap();

        let report = acc.finish(None).unwrap();
        assert_eq!(report.global_feature_importance.len(), GLOBAL_TOP_K);
        assert_eq!(report.global_feature_importance[0].0, "f14");
    }

    #[test]
    fn test_empty_batch_rejected() {
        let acc = GlobalImportanceAccumulator::new(&names(2));
        assert!(matches!(acc.finish(None), Err(ExplainError::InvalidInput(_))));
    }

    #[test]
    fn test_recommendation_rules() {
        let sparse = vec![1.0, 0.0, 0.0, 0.0];
        let recs =
            behavior_recommendations(Complexity::Low, &sparse, interpretability_score(&sparse));
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("feature selection"));

        let diffuse = vec![0.5, 0.5, 0.5];
        let recs = behavior_recommendations(
            Complexity::Medium,
            &diffuse,
            interpretability_score(&diffuse),
        );
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("simpler model"));
    }
}
