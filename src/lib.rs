//! Kolosal Explain - prediction explainability engine
//!
//! Wraps an opaque model behind an inference port and explains its
//! predictions without access to its internals.
//!
//! # Modules
//!
//! - [`inference`] - Inference port, prediction normalization, fan-out predictor
//! - [`explainability`] - Attribution strategies, reasoning, counterfactuals,
//!   behavior analysis and validation
//! - [`linalg`] - Small dense solvers used by the LIME surrogate
//! - [`utils`] - Worker pool, cancellation and timing
//! - [`error`] - Error type shared by every module
//!
//! # Example
//!
//! ```
//! use kolosal_explain::prelude::*;
//!
//! let model = |x: &[f64]| -> kolosal_explain::Result<Vec<f64>> { Ok(vec![2.0 * x[0] - x[1]]) };
//! let engine = ExplainabilityEngine::new(
//!     EngineConfig::new()
//!         .with_method(AttributionMethod::Permutation)
//!         .with_seed(42),
//! )
//! .unwrap();
//!
//! let names = vec!["income".to_string(), "debt".to_string()];
//! let result = engine
//!     .explain_prediction(&model, &[0.6, 0.3], &names, TaskType::Regression)
//!     .unwrap();
//! assert_eq!(result.explanation.features.len(), 2);
//! ```

pub mod error;
pub mod explainability;
pub mod inference;
pub mod linalg;
pub mod utils;

pub use error::{ExplainError, Result};

/// Commonly used types
pub mod prelude {
    pub use crate::error::{ExplainError, Result};
    pub use crate::explainability::{
        AttributionMethod, Contribution, EngineConfig, ExplainabilityEngine, ExplainableResult,
        FeatureImportance, ModelBehaviorReport, ValidationReport,
    };
    pub use crate::inference::{
        DescribedModel, InferencePort, ModelArchitecture, Outcome, Prediction, Scorable, TaskType,
    };
    pub use crate::utils::CancellationToken;
}
