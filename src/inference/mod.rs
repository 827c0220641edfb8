//! Inference port and prediction normalization
//!
//! Provides the boundary to the opaque model being explained:
//! - [`InferencePort`]: one blocking `infer` call per feature vector
//! - [`Prediction`]: typed classification/regression output
//! - [`Scorable`]: scalar score and confidence used by every explainer
//! - [`Predictor`]: validating, cancellable, fan-out capable wrapper

mod port;
mod prediction;
mod predictor;

pub use port::{DescribedModel, InferencePort, ModelArchitecture};
pub use prediction::{regression_confidence, Outcome, Prediction, Scorable, TaskType};
pub use predictor::Predictor;
