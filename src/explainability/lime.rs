//! LIME: locally weighted linear surrogate

use super::attribution::AttributionStrategy;
use super::config::AttributionMethod;
use super::importance::{rank_importances, FeatureImportance};
use crate::error::{ExplainError, Result};
use crate::inference::Predictor;
use crate::linalg;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Linear model fitted around one instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSurrogate {
    /// One coefficient per input feature
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Ridge term the final solve used
    pub ridge_lambda: f64,
}

/// Samples a neighbourhood of the instance, weights it with an exponential
/// distance kernel and fits `score ≈ Σ wᵢ·xᵢ + b` by weighted least squares.
///
/// Features are assumed normalized to `[0, 1]`; neighbours are clipped there.
#[derive(Debug, Clone)]
pub struct LimeExplainer {
    /// Neighbourhood size
    n_samples: usize,
    kernel_width: f64,
    /// Half-width of the uniform perturbation
    noise: f64,
    ridge_lambda: f64,
    fallback_ridge_lambda: f64,
}

impl Default for LimeExplainer {
    fn default() -> Self {
        Self::new()
    }
}

impl LimeExplainer {
    pub fn new() -> Self {
        Self {
            n_samples: 1000,
            kernel_width: 0.75,
            noise: 0.1,
            ridge_lambda: 1e-6,
            fallback_ridge_lambda: 1e-3,
        }
    }

    /// Set neighbourhood size
    pub fn with_n_samples(mut self, n: usize) -> Self {
        self.n_samples = n.max(2);
        self
    }

    /// Set kernel width
    pub fn with_kernel_width(mut self, width: f64) -> Self {
        self.kernel_width = width;
        self
    }

    /// Set perturbation half-width
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Set the ridge term and the one used for the degenerate-solve retry
    pub fn with_ridge(mut self, lambda: f64, fallback: f64) -> Self {
        self.ridge_lambda = lambda;
        self.fallback_ridge_lambda = fallback;
        self
    }

    /// Draw neighbours of `input`, clipped to `[0, 1]`
    fn sample_neighbours(&self, input: &[f64], rng: &mut Xoshiro256PlusPlus) -> Vec<Vec<f64>> {
        (0..self.n_samples)
            .map(|_| {
                input
                    .iter()
                    .map(|&v| (v + rng.gen_range(-self.noise..=self.noise)).clamp(0.0, 1.0))
                    .collect()
            })
            .collect()
    }

    /// Exponential kernel weights, relative to the closest neighbour.
    ///
    /// Computed as `exp(-(d - d_min) / width)` so the largest weight is 1 and
    /// far-away neighbourhoods do not underflow to zero.
    fn kernel_weights(&self, neighbours: &[Vec<f64>], input: &[f64]) -> Vec<f64> {
        let distances: Vec<f64> = neighbours
            .iter()
            .map(|z| {
                z.iter()
                    .zip(input)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .collect();
        let nearest = distances.iter().copied().fold(f64::INFINITY, f64::min);
        distances
            .iter()
            .map(|d| (-(d - nearest) / self.kernel_width).exp())
            .collect()
    }

    /// Fit the local surrogate for one instance
    pub fn surrogate(
        &self,
        predictor: &Predictor<'_>,
        input: &[f64],
        rng: &mut Xoshiro256PlusPlus,
    ) -> Result<LocalSurrogate> {
        let neighbours = self.sample_neighbours(input, rng);
        let targets = predictor.score_many(&neighbours)?;
        let weights = self.kernel_weights(&neighbours, input);

        self.fit(&neighbours, &targets, &weights)
    }

    /// Weighted least squares through the normal equations
    /// `(XᵀWX + λI')β = XᵀWy`, bias column last and unpenalized.
    ///
    /// Weights are rescaled to a maximum of 1 first, so the ridge term and the
    /// pivot threshold act relative to the neighbourhood rather than to the
    /// kernel's absolute scale.
    fn fit(
        &self,
        samples: &[Vec<f64>],
        targets: &[f64],
        weights: &[f64],
    ) -> Result<LocalSurrogate> {
        let n_rows = samples.len();
        let n_features = samples.first().map(|s| s.len()).unwrap_or(0);
        if n_rows == 0 || n_features == 0 {
            return Err(ExplainError::InvalidInput(
                "cannot fit a surrogate to an empty neighbourhood".to_string(),
            ));
        }
        let n_cols = n_features + 1;

        let max_weight = weights.iter().copied().fold(0.0_f64, f64::max);
        let scale = if max_weight.is_finite() && max_weight > 0.0 {
            1.0 / max_weight
        } else {
            1.0
        };

        let mut design = Array2::zeros((n_rows, n_cols));
        let mut weighted = Array2::zeros((n_rows, n_cols));
        let mut weighted_targets = Array1::zeros(n_rows);
        for (row, sample) in samples.iter().enumerate() {
            let w = weights[row] * scale;
            for (col, &value) in sample.iter().enumerate() {
                design[[row, col]] = value;
                weighted[[row, col]] = w * value;
            }
            design[[row, n_features]] = 1.0;
            weighted[[row, n_features]] = w;
            weighted_targets[row] = w * targets[row];
        }

        let design_t = linalg::transpose(&design);
        let gram = linalg::multiply(&design_t, &weighted)?;
        let rhs = linalg::mat_vec_multiply(&design_t, &weighted_targets)?;

        let (beta, lambda) = match solve_ridge(&gram, &rhs, self.ridge_lambda) {
            Ok(beta) => (beta, self.ridge_lambda),
            Err(ExplainError::NumericDegeneracy { column, pivot }) => {
                warn!(
                    column,
                    pivot,
                    retry_lambda = self.fallback_ridge_lambda,
                    "degenerate LIME normal equations, retrying with stronger ridge"
                );
                let beta = solve_ridge(&gram, &rhs, self.fallback_ridge_lambda)?;
                (beta, self.fallback_ridge_lambda)
            }
            Err(e) => return Err(e),
        };

        if let Some(pos) = beta.iter().position(|b| !b.is_finite()) {
            return Err(ExplainError::NumericDegeneracy {
                column: pos,
                pivot: f64::NAN,
            });
        }

        Ok(LocalSurrogate {
            coefficients: beta.iter().take(n_features).copied().collect(),
            intercept: beta[n_features],
            ridge_lambda: lambda,
        })
    }
}

fn solve_ridge(gram: &Array2<f64>, rhs: &Array1<f64>, lambda: f64) -> Result<Array1<f64>> {
    let mut a = gram.clone();
    linalg::add_ridge(&mut a, lambda, true);
    linalg::solve(&a, rhs)
}

impl AttributionStrategy for LimeExplainer {
    fn method(&self) -> AttributionMethod {
        AttributionMethod::Lime
    }

    fn attribute(
        &self,
        predictor: &Predictor<'_>,
        input: &[f64],
        feature_names: &[String],
        rng: &mut Xoshiro256PlusPlus,
    ) -> Result<Vec<FeatureImportance>> {
        let surrogate = self.surrogate(predictor, input, rng)?;

        debug!(
            n_samples = self.n_samples,
            intercept = surrogate.intercept,
            ridge_lambda = surrogate.ridge_lambda,
            "LIME surrogate fitted"
        );

        let importances = surrogate
            .coefficients
            .iter()
            .enumerate()
            .map(|(idx, &coef)| {
                FeatureImportance::from_effect(feature_names[idx].clone(), idx, coef, input[idx])
            })
            .collect();

        Ok(rank_importances(importances))
    }
}
