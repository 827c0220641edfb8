//! Explainability engine
//!
//! Ties the pipeline together for one model call:
//! - normalize the model output into a [`Prediction`]
//! - attribute it with the configured strategy
//! - write the reasoning paragraph and counterfactual alternatives
//! - aggregate over batches for behavior analysis and validation

use super::attribution::{check_instance, strategy_for};
use super::behavior::{GlobalImportanceAccumulator, ModelBehaviorReport};
use super::config::EngineConfig;
use super::counterfactual::CounterfactualGenerator;
use super::reasoning::synthesize_reasoning;
use super::result::{ExplainableResult, Explanation, ExplanationMetadata};
use super::validation::{ExplanationValidator, ValidationReport};
use crate::error::{ExplainError, Result};
use crate::inference::{InferencePort, Outcome, Predictor, Scorable, TaskType};
use crate::utils::{CancellationToken, Deadline, Timer, WorkerPool};
use chrono::Utc;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::Duration;
use tracing::{debug, info};

/// Explains predictions of an opaque model.
///
/// Holds only immutable configuration and a worker pool, so one engine can
/// serve concurrent callers.
pub struct ExplainabilityEngine {
    config: EngineConfig,
    pool: WorkerPool,
}

impl std::fmt::Debug for ExplainabilityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplainabilityEngine")
            .field("config", &self.config)
            .field("concurrency", &self.pool.concurrency())
            .finish()
    }
}

impl ExplainabilityEngine {
    /// Create an engine, validating the configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let pool = WorkerPool::new(&config.parallel_config())?;
        debug!(
            method = %config.explainability.method,
            concurrency = pool.concurrency(),
            "explainability engine created"
        );
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Predict and explain a single input
    pub fn explain_prediction(
        &self,
        model: &dyn InferencePort,
        input: &[f64],
        feature_names: &[String],
        task: TaskType,
    ) -> Result<ExplainableResult> {
        self.explain_stream(model, input, feature_names, task, None, 0)
    }

    /// Like [`explain_prediction`](Self::explain_prediction), abandoning the
    /// call once `cancel` is triggered
    pub fn explain_prediction_with_cancel(
        &self,
        model: &dyn InferencePort,
        input: &[f64],
        feature_names: &[String],
        task: TaskType,
        cancel: &CancellationToken,
    ) -> Result<ExplainableResult> {
        self.explain_stream(model, input, feature_names, task, Some(cancel), 0)
    }

    /// Explain every input in order.
    ///
    /// Input `i` samples from random stream `i`, so a seeded batch is
    /// reproducible item by item.
    pub fn explain_batch(
        &self,
        model: &dyn InferencePort,
        inputs: &[Vec<f64>],
        feature_names: &[String],
        task: TaskType,
    ) -> Result<Vec<ExplainableResult>> {
        self.batch(model, inputs, feature_names, task, None)
    }

    /// Like [`explain_batch`](Self::explain_batch), abandoning the whole
    /// batch once `cancel` is triggered
    pub fn explain_batch_with_cancel(
        &self,
        model: &dyn InferencePort,
        inputs: &[Vec<f64>],
        feature_names: &[String],
        task: TaskType,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExplainableResult>> {
        self.batch(model, inputs, feature_names, task, Some(cancel))
    }

    /// Aggregate attributions over a batch into a global report
    pub fn explain_model_behavior(
        &self,
        model: &dyn InferencePort,
        inputs: &[Vec<f64>],
        feature_names: &[String],
        task: TaskType,
    ) -> Result<ModelBehaviorReport> {
        self.behavior(model, inputs, feature_names, task, None)
    }

    /// Like [`explain_model_behavior`](Self::explain_model_behavior),
    /// abandoning the analysis once `cancel` is triggered
    pub fn explain_model_behavior_with_cancel(
        &self,
        model: &dyn InferencePort,
        inputs: &[Vec<f64>],
        feature_names: &[String],
        task: TaskType,
        cancel: &CancellationToken,
    ) -> Result<ModelBehaviorReport> {
        self.behavior(model, inputs, feature_names, task, Some(cancel))
    }

    /// Score explanations against expected outcomes
    pub fn validate_explanations(
        &self,
        explanations: &[ExplainableResult],
        test_inputs: &[Vec<f64>],
        expected_outputs: &[Outcome],
    ) -> Result<ValidationReport> {
        let report =
            ExplanationValidator::new().validate(explanations, test_inputs, expected_outputs)?;
        info!(
            overall_consistency = report.overall_consistency,
            overall_accuracy = report.overall_accuracy,
            n = report.validation_results.len(),
            "explanations validated"
        );
        Ok(report)
    }

    fn batch(
        &self,
        model: &dyn InferencePort,
        inputs: &[Vec<f64>],
        feature_names: &[String],
        task: TaskType,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<ExplainableResult>> {
        inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                self.explain_stream(model, input, feature_names, task, cancel, i as u64)
            })
            .collect()
    }

    fn behavior(
        &self,
        model: &dyn InferencePort,
        inputs: &[Vec<f64>],
        feature_names: &[String],
        task: TaskType,
        cancel: Option<&CancellationToken>,
    ) -> Result<ModelBehaviorReport> {
        if inputs.is_empty() {
            return Err(ExplainError::InvalidInput(
                "behavior analysis needs at least one input".to_string(),
            ));
        }
        for input in inputs {
            check_instance(input, feature_names)?;
        }

        let timer = Timer::start("explain_model_behavior");
        let strategy = strategy_for(self.config.explainability.method, &self.config.sampling);
        let predictor = self.predictor(model, task, cancel);
        let mut accumulator = GlobalImportanceAccumulator::new(feature_names);

        for (i, input) in inputs.iter().enumerate() {
            let mut rng = self.rng(i as u64);
            let importances = strategy.attribute(&predictor, input, feature_names, &mut rng)?;
            accumulator.add(&importances)?;
        }
        predictor.check_interrupted()?;

        let report = accumulator.finish(model.architecture())?;

        info!(
            n_instances = report.n_instances,
            complexity = ?report.complexity,
            interpretability_score = report.interpretability_score,
            inference_count = predictor.inference_count(),
            elapsed_ms = timer.elapsed_ms(),
            "model behavior analyzed"
        );

        Ok(report)
    }

    fn explain_stream(
        &self,
        model: &dyn InferencePort,
        input: &[f64],
        feature_names: &[String],
        task: TaskType,
        cancel: Option<&CancellationToken>,
        stream: u64,
    ) -> Result<ExplainableResult> {
        check_instance(input, feature_names)?;

        let timer = Timer::start("explain_prediction");
        let predictor = self.predictor(model, task, cancel);
        let mut rng = self.rng(stream);

        let prediction = predictor.predict(input)?;

        let method = self.config.explainability.method;
        let features = strategy_for(method, &self.config.sampling).attribute(
            &predictor,
            input,
            feature_names,
            &mut rng,
        )?;

        let reasoning =
            synthesize_reasoning(&features, &prediction, self.config.explainability.max_features);

        let alternative_outcomes = if self.config.explainability.include_alternatives {
            CounterfactualGenerator::new()
                .with_step(self.config.sampling.counterfactual_step)
                .with_max_alternatives(self.config.explainability.max_alternatives)
                .generate(&predictor, input, &prediction, &features)?
        } else {
            Vec::new()
        };

        // A cancel raised after the last inference still discards the result
        predictor.check_interrupted()?;

        let metadata = ExplanationMetadata {
            model_version: model.version().unwrap_or_else(|| "unknown".to_string()),
            method,
            timestamp: Utc::now(),
            processing_time_ms: timer.elapsed_ms(),
            inference_count: predictor.inference_count(),
        };

        info!(
            method = %method,
            outcome = %prediction.outcome(),
            n_features = features.len(),
            n_alternatives = alternative_outcomes.len(),
            inference_count = metadata.inference_count,
            elapsed_ms = metadata.processing_time_ms,
            "prediction explained"
        );

        Ok(ExplainableResult {
            confidence: prediction.confidence(),
            prediction,
            explanation: Explanation {
                features,
                reasoning,
                alternative_outcomes,
            },
            metadata,
        })
    }

    fn predictor<'a>(
        &'a self,
        model: &'a dyn InferencePort,
        task: TaskType,
        cancel: Option<&CancellationToken>,
    ) -> Predictor<'a> {
        let mut predictor = Predictor::new(model, task, &self.pool);
        if let Some(token) = cancel {
            predictor = predictor.with_cancellation(token.clone());
        }
        if let Some(ms) = self.config.runtime.timeout_ms {
            predictor = predictor.with_deadline(Deadline::after(Duration::from_millis(ms)));
        }
        predictor
    }

    fn rng(&self, stream: u64) -> Xoshiro256PlusPlus {
        match self.config.runtime.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(stream)),
            None => Xoshiro256PlusPlus::from_entropy(),
        }
    }
}
