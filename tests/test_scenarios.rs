//! Integration test: reference scenarios end to end

use chrono::Utc;
use kolosal_explain::explainability::{
    AttributionMethod, Contribution, EngineConfig, ExplainabilityEngine, ExplainableResult,
    Explanation, ExplanationMetadata, FeatureImportance, LimeExplainer,
};
use kolosal_explain::inference::{Outcome, Prediction, Predictor, TaskType};
use kolosal_explain::utils::WorkerPool;
use kolosal_explain::Result;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_permutation_single_driver_classifier() {
    let model = |x: &[f64]| -> Result<Vec<f64>> {
        let p = sigmoid(5.0 * x[0]);
        Ok(vec![1.0 - p, p])
    };
    let engine = ExplainabilityEngine::new(
        EngineConfig::new()
            .with_method(AttributionMethod::Permutation)
            .with_seed(2024),
    )
    .unwrap();

    let features = names(&["age", "skill", "location"]);
    let result = engine
        .explain_prediction(&model, &[0.9, 0.1, 0.5], &features, TaskType::Classification)
        .unwrap();

    assert_eq!(result.prediction.class_index(), Some(1));
    assert!(result.confidence > 0.98);

    let ranked = &result.explanation.features;
    assert_eq!(ranked[0].feature, "age");
    assert!(ranked[0].importance > 0.0);
    for other in &ranked[1..] {
        assert_eq!(other.importance, 0.0);
        assert_eq!(other.contribution, Contribution::Neutral);
    }
    assert!(result.explanation.reasoning.contains("class 1"));
    assert!(result.explanation.reasoning.contains("age"));
}

#[test]
fn test_lime_recovers_linear_regression() {
    let model = |x: &[f64]| -> Result<Vec<f64>> { Ok(vec![x[0] - x[1]]) };
    let pool = WorkerPool::sequential();
    let predictor = Predictor::new(&model, TaskType::Regression, &pool);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);

    let surrogate = LimeExplainer::new()
        .with_n_samples(1000)
        .surrogate(&predictor, &[0.8, 0.2, 0.5], &mut rng)
        .unwrap();

    let expected = [1.0, -1.0, 0.0];
    for (beta, want) in surrogate.coefficients.iter().zip(expected) {
        assert!((beta - want).abs() < 0.1, "coefficient {} vs {}", beta, want);
    }

    let engine = ExplainabilityEngine::new(
        EngineConfig::new()
            .with_method(AttributionMethod::Lime)
            .with_seed(11),
    )
    .unwrap();
    let result = engine
        .explain_prediction(
            &model,
            &[0.8, 0.2, 0.5],
            &names(&["a", "b", "c"]),
            TaskType::Regression,
        )
        .unwrap();

    let ranked = &result.explanation.features;
    assert_eq!(ranked[2].feature, "c");
    let a = ranked.iter().find(|f| f.feature == "a").unwrap();
    let b = ranked.iter().find(|f| f.feature == "b").unwrap();
    assert_eq!(a.contribution, Contribution::Positive);
    assert_eq!(b.contribution, Contribution::Negative);
    assert!((a.importance - 1.0).abs() < 0.1);
    assert!((b.importance - 1.0).abs() < 0.1);
}

fn exact_result(value: f64) -> ExplainableResult {
    let prediction = Prediction::from_output(&[value], TaskType::Regression).unwrap();
    ExplainableResult {
        confidence: 0.95,
        prediction,
        explanation: Explanation {
            features: vec![
                FeatureImportance::from_effect("x0", 0, 0.6, 0.5),
                FeatureImportance::from_effect("x1", 1, -0.25, 0.5),
                FeatureImportance::from_effect("x2", 2, 0.15, 0.5),
            ],
            reasoning: String::new(),
            alternative_outcomes: vec![],
        },
        metadata: ExplanationMetadata {
            model_version: "fixture".to_string(),
            method: AttributionMethod::Shap,
            timestamp: Utc::now(),
            processing_time_ms: 0.0,
            inference_count: 0,
        },
    }
}

#[test]
fn test_validator_ready_for_production() {
    let engine = ExplainabilityEngine::new(EngineConfig::new()).unwrap();
    let explanations = vec![exact_result(0.5), exact_result(1.5)];
    let inputs = vec![vec![0.5, 0.5, 0.5], vec![0.5, 0.5, 0.5]];
    let expected = vec![Outcome::Value(0.5), Outcome::Value(1.5)];

    let report = engine
        .validate_explanations(&explanations, &inputs, &expected)
        .unwrap();

    assert!((report.overall_consistency - 1.0).abs() < 1e-12);
    assert_eq!(report.overall_accuracy, 1.0);
    assert_eq!(report.validation_results.len(), 2);
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("ready for production")));
}
