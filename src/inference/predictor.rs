//! Validating, cancellable access to an inference port

use super::{InferencePort, Prediction, Scorable, TaskType};
use crate::error::{ExplainError, Result};
use crate::utils::{CancellationToken, Deadline, WorkerPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Wraps one inference port for the duration of a single engine call.
///
/// Every `predict` performs exactly one port invocation. The first output
/// fixes the expected output length; later outputs of a different length are
/// rejected. Cancellation and the deadline are checked before each call.
pub struct Predictor<'a> {
    model: &'a dyn InferencePort,
    task: TaskType,
    pool: &'a WorkerPool,
    cancel: Option<CancellationToken>,
    deadline: Option<Deadline>,
    output_len: OnceLock<usize>,
    inference_count: AtomicUsize,
}

impl<'a> Predictor<'a> {
    pub fn new(model: &'a dyn InferencePort, task: TaskType, pool: &'a WorkerPool) -> Self {
        Self {
            model,
            task,
            pool,
            cancel: None,
            deadline: None,
            output_len: OnceLock::new(),
            inference_count: AtomicUsize::new(0),
        }
    }

    /// Observe a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fail once the deadline passes
    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn task_type(&self) -> TaskType {
        self.task
    }

    /// Number of port invocations made so far
    pub fn inference_count(&self) -> usize {
        self.inference_count.load(Ordering::Relaxed)
    }

    /// Error if the call was cancelled or ran out of time
    pub fn check_interrupted(&self) -> Result<()> {
        if let Some(token) = &self.cancel {
            if token.is_cancelled() {
                return Err(ExplainError::Cancelled);
            }
        }
        if let Some(deadline) = &self.deadline {
            deadline.check()?;
        }
        Ok(())
    }

    /// Run the model once and normalize its output
    pub fn predict(&self, input: &[f64]) -> Result<Prediction> {
        self.check_interrupted()?;

        self.inference_count.fetch_add(1, Ordering::Relaxed);
        let output = self.model.infer(input)?;
        let prediction = Prediction::from_output(&output, self.task)?;

        let expected = *self.output_len.get_or_init(|| output.len());
        if output.len() != expected {
            return Err(ExplainError::InferenceError(format!(
                "model output length changed from {} to {} within one call",
                expected,
                output.len()
            )));
        }

        Ok(prediction)
    }

    /// Predict every input with bounded fan-out, preserving order
    pub fn predict_many(&self, inputs: &[Vec<f64>]) -> Result<Vec<Prediction>> {
        self.pool.try_map(inputs, |input| self.predict(input))
    }

    /// Scores of every input, preserving order
    pub fn score_many(&self, inputs: &[Vec<f64>]) -> Result<Vec<f64>> {
        self.pool.try_map(inputs, |input| self.predict(input).map(|p| p.score()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ParallelConfig;
    use std::time::Duration;

    fn pool() -> WorkerPool {
        WorkerPool::new(&ParallelConfig::new().with_threads(2).with_min_parallel_len(1)).unwrap()
    }

    #[test]
    fn test_predict_counts_inferences() {
        let model = |x: &[f64]| -> Result<Vec<f64>> { Ok(vec![x[0] * 2.0]) };
        let pool = pool();
        let predictor = Predictor::new(&model, TaskType::Regression, &pool);

        let p = predictor.predict(&[1.5]).unwrap();
        assert_eq!(p.value(), Some(3.0));
        assert_eq!(predictor.inference_count(), 1);

        let scores = predictor
            .score_many(&[vec![0.0], vec![1.0], vec![2.0]])
            .unwrap();
        assert_eq!(scores, vec![0.0, 2.0, 4.0]);
        assert_eq!(predictor.inference_count(), 4);
    }

    #[test]
    fn test_inconsistent_output_length_rejected() {
        let model = |x: &[f64]| -> Result<Vec<f64>> {
            if x[0] > 0.5 {
                Ok(vec![0.2, 0.8])
            } else {
                Ok(vec![0.1, 0.2, 0.7])
            }
        };
        let pool = WorkerPool::sequential();
        let predictor = Predictor::new(&model, TaskType::Classification, &pool);

        assert!(predictor.predict(&[0.9]).is_ok());
        assert!(matches!(
            predictor.predict(&[0.1]),
            Err(ExplainError::InferenceError(_))
        ));
    }

    #[test]
    fn test_port_error_propagates() {
        let model = |_: &[f64]| -> Result<Vec<f64>> {
            Err(ExplainError::InferenceError("connection refused".to_string()))
        };
        let pool = pool();
        let predictor = Predictor::new(&model, TaskType::Regression, &pool);
        let err = predictor.predict_many(&vec![vec![0.0]; 16]).unwrap_err();
        assert!(matches!(err, ExplainError::InferenceError(_)));
    }

    #[test]
    fn test_cancelled_predictor_makes_no_calls() {
        let model = |x: &[f64]| -> Result<Vec<f64>> { Ok(vec![x[0]]) };
        let pool = pool();
        let token = CancellationToken::new();
        token.cancel();
        let predictor =
            Predictor::new(&model, TaskType::Regression, &pool).with_cancellation(token);

        assert!(matches!(predictor.predict(&[1.0]), Err(ExplainError::Cancelled)));
        assert_eq!(predictor.inference_count(), 0);
    }

    #[test]
    fn test_expired_deadline() {
        let model = |x: &[f64]| -> Result<Vec<f64>> { Ok(vec![x[0]]) };
        let pool = pool();
        let predictor = Predictor::new(&model, TaskType::Regression, &pool)
            .with_deadline(Deadline::after(Duration::ZERO));
        assert!(matches!(
            predictor.predict(&[1.0]),
            Err(ExplainError::DeadlineExceeded { .. })
        ));
    }
}
