//! Monte-Carlo Shapley value approximation

use super::attribution::AttributionStrategy;
use super::config::AttributionMethod;
use super::importance::{rank_importances, FeatureImportance};
use crate::error::Result;
use crate::inference::Predictor;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

/// Estimates each feature's average marginal contribution over random
/// coalitions of the other features, against an all-zero baseline.
///
/// Per trial every other feature joins the coalition with probability 0.5.
/// Costs `2 * n_samples` inferences per feature; the trials of one feature
/// are fanned out together.
#[derive(Debug, Clone)]
pub struct ShapSampler {
    /// Trials per feature
    n_samples: usize,
    /// Value used for features outside the coalition
    baseline: f64,
}

impl Default for ShapSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapSampler {
    pub fn new() -> Self {
        Self {
            n_samples: 100,
            baseline: 0.0,
        }
    }

    /// Set number of trials per feature
    pub fn with_n_samples(mut self, n: usize) -> Self {
        self.n_samples = n.max(1);
        self
    }

    /// Draw `(with, without)` coalition pairs for one feature
    fn coalition_pairs(
        &self,
        input: &[f64],
        feature_idx: usize,
        rng: &mut Xoshiro256PlusPlus,
    ) -> Vec<Vec<f64>> {
        let mut batch = Vec::with_capacity(2 * self.n_samples);
        for _ in 0..self.n_samples {
            let mut without = vec![self.baseline; input.len()];
            for (j, &value) in input.iter().enumerate() {
                if j != feature_idx && rng.gen_bool(0.5) {
                    without[j] = value;
                }
            }
            let mut with = without.clone();
            with[feature_idx] = input[feature_idx];

            batch.push(with);
            batch.push(without);
        }
        batch
    }
}

impl AttributionStrategy for ShapSampler {
    fn method(&self) -> AttributionMethod {
        AttributionMethod::Shap
    }

    fn attribute(
        &self,
        predictor: &Predictor<'_>,
        input: &[f64],
        feature_names: &[String],
        rng: &mut Xoshiro256PlusPlus,
    ) -> Result<Vec<FeatureImportance>> {
        let mut importances = Vec::with_capacity(input.len());

        for feature_idx in 0..input.len() {
            let batch = self.coalition_pairs(input, feature_idx, rng);
            let scores = predictor.score_many(&batch)?;

            let total: f64 = scores.chunks_exact(2).map(|pair| pair[0] - pair[1]).sum();
            let mean = total / self.n_samples as f64;

            importances.push(FeatureImportance::from_effect(
                feature_names[feature_idx].clone(),
                feature_idx,
                mean,
                input[feature_idx],
            ));
        }

        debug!(
            n_features = input.len(),
            n_samples = self.n_samples,
            "shapley values estimated"
        );
        Ok(rank_importances(importances))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explainability::Contribution;
    use crate::inference::TaskType;
    use crate::utils::{ParallelConfig, WorkerPool};

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("x{}", i)).collect()
    }

    #[test]
    fn test_additive_model_recovers_exact_contributions() {
        // For an additive model every marginal contribution is w_i * x_i
        let model = |x: &[f64]| -> Result<Vec<f64>> { Ok(vec![x[0] + 2.0 * x[1] - 3.0 * x[2]]) };
        let pool = WorkerPool::sequential();
        let predictor = Predictor::new(&model, TaskType::Regression, &pool);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let input = [0.5, 0.5, 0.5];

        let result = ShapSampler::new()
            .with_n_samples(20)
            .attribute(&predictor, &input, &names(3), &mut rng)
            .unwrap();

        assert_eq!(result[0].feature, "x2");
        assert!((result[0].importance - 1.5).abs() < 1e-9);
        assert_eq!(result[0].contribution, Contribution::Negative);
        assert_eq!(result[1].feature, "x1");
        assert!((result[1].importance - 1.0).abs() < 1e-9);
        assert_eq!(result[2].feature, "x0");
        assert!((result[2].importance - 0.5).abs() < 1e-9);
        assert_eq!(predictor.inference_count(), 3 * 2 * 20);
    }

    #[test]
    fn test_interaction_is_shared() {
        // y = x0 * x1: each feature gets roughly half the interaction
        let model = |x: &[f64]| -> Result<Vec<f64>> { Ok(vec![x[0] * x[1]]) };
        let pool =
            WorkerPool::new(&ParallelConfig::new().with_threads(4).with_min_parallel_len(1))
                .unwrap();
        let predictor = Predictor::new(&model, TaskType::Regression, &pool);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);

        let result = ShapSampler::new()
            .with_n_samples(400)
            .attribute(&predictor, &[1.0, 1.0], &names(2), &mut rng)
            .unwrap();

        for f in &result {
            assert!((f.importance - 0.5).abs() < 0.15, "{:?}", f);
        }
    }

    #[test]
    fn test_seeded_parallel_runs_are_identical() {
        let model = |x: &[f64]| -> Result<Vec<f64>> {
            let p = 1.0 / (1.0 + (-(x[0] - x[1] + 0.5 * x[2])).exp());
            Ok(vec![1.0 - p, p])
        };
        let pool =
            WorkerPool::new(&ParallelConfig::new().with_threads(4).with_min_parallel_len(1))
                .unwrap();
        let input = [0.7, 0.2, 0.4];

        let run = || {
            let predictor = Predictor::new(&model, TaskType::Classification, &pool);
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
            ShapSampler::new()
                .with_n_samples(50)
                .attribute(&predictor, &input, &names(3), &mut rng)
                .unwrap()
        };

        assert_eq!(run(), run());
    }
}
