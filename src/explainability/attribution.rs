//! Attribution strategy interface

use super::config::{AttributionMethod, SamplingConfig};
use super::importance::FeatureImportance;
use super::lime::LimeExplainer;
use super::permutation::PermutationImportance;
use super::shap::ShapSampler;
use crate::error::{ExplainError, Result};
use crate::inference::Predictor;
use rand_xoshiro::Xoshiro256PlusPlus;

/// A way of attributing one prediction to its input features.
///
/// Implementations draw all randomness from `rng` before fanning out
/// inferences, so a fixed seed gives identical output regardless of how
/// the worker pool schedules calls. Output is ranked by importance.
pub trait AttributionStrategy: Send + Sync {
    fn method(&self) -> AttributionMethod;

    fn attribute(
        &self,
        predictor: &Predictor<'_>,
        input: &[f64],
        feature_names: &[String],
        rng: &mut Xoshiro256PlusPlus,
    ) -> Result<Vec<FeatureImportance>>;
}

/// Build the strategy for a configured method
pub fn strategy_for(
    method: AttributionMethod,
    sampling: &SamplingConfig,
) -> Box<dyn AttributionStrategy> {
    match method {
        AttributionMethod::Permutation => Box::new(PermutationImportance::new()),
        AttributionMethod::Shap => {
            Box::new(ShapSampler::new().with_n_samples(sampling.shap_samples))
        }
        AttributionMethod::Lime => Box::new(
            LimeExplainer::new()
                .with_n_samples(sampling.lime_samples)
                .with_kernel_width(sampling.lime_kernel_width)
                .with_noise(sampling.lime_noise)
                .with_ridge(sampling.ridge_lambda, sampling.fallback_ridge_lambda),
        ),
    }
}

/// Check one instance against its feature names
pub fn check_instance(input: &[f64], feature_names: &[String]) -> Result<()> {
    if input.is_empty() {
        return Err(ExplainError::InvalidInput("input vector is empty".to_string()));
    }
    if input.len() != feature_names.len() {
        return Err(ExplainError::ShapeError {
            expected: format!("{} features (one per name)", feature_names.len()),
            actual: format!("{} values", input.len()),
        });
    }
    if let Some(pos) = input.iter().position(|v| !v.is_finite()) {
        return Err(ExplainError::InvalidInput(format!(
            "feature '{}' has non-finite value {}",
            feature_names[pos], input[pos]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_strategy_for_each_method() {
        let sampling = SamplingConfig::default();
        for method in [
            AttributionMethod::Shap,
            AttributionMethod::Lime,
            AttributionMethod::Permutation,
        ] {
            assert_eq!(strategy_for(method, &sampling).method(), method);
        }
    }

    #[test]
    fn test_check_instance() {
        assert!(check_instance(&[0.1, 0.2], &names(2)).is_ok());
        assert!(matches!(
            check_instance(&[], &names(0)),
            Err(ExplainError::InvalidInput(_))
        ));
        assert!(matches!(
            check_instance(&[0.1, 0.2], &names(3)),
            Err(ExplainError::ShapeError { .. })
        ));
        assert!(matches!(
            check_instance(&[0.1, f64::NAN], &names(2)),
            Err(ExplainError::InvalidInput(_))
        ));
    }
}
