//! Error types for the explainability engine

use thiserror::Error;

/// Result type alias for explainability operations
pub type Result<T> = std::result::Result<T, ExplainError>;

/// Main error type for the explainability engine
#[derive(Error, Debug)]
pub enum ExplainError {
    /// The inference port failed or returned an unusable output vector
    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    /// A pivot in the linear solver vanished; the system is (near) singular
    #[error("Numeric degeneracy: pivot {pivot:e} in column {column}")]
    NumericDegeneracy { column: usize, pivot: f64 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Explanation cancelled")]
    Cancelled,

    #[error("Deadline of {budget_ms}ms exceeded")]
    DeadlineExceeded { budget_ms: u64 },

    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ExplainError {
    /// Whether the error was caused by cancellation or an expired deadline
    pub fn is_interrupted(&self) -> bool {
        matches!(self, ExplainError::Cancelled | ExplainError::DeadlineExceeded { .. })
    }
}

impl From<serde_json::Error> for ExplainError {
    fn from(err: serde_json::Error) -> Self {
        ExplainError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExplainError::InferenceError("model offline".to_string());
        assert_eq!(err.to_string(), "Inference error: model offline");

        let err = ExplainError::DeadlineExceeded { budget_ms: 250 };
        assert_eq!(err.to_string(), "Deadline of 250ms exceeded");
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ExplainError = json_err.into();
        assert!(matches!(err, ExplainError::SerializationError(_)));
    }

    #[test]
    fn test_is_interrupted() {
        assert!(ExplainError::Cancelled.is_interrupted());
        assert!(ExplainError::DeadlineExceeded { budget_ms: 1 }.is_interrupted());
        assert!(!ExplainError::ConfigError("x".into()).is_interrupted());
    }
}
