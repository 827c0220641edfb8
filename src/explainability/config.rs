//! Explainability engine configuration

use crate::error::{ExplainError, Result};
use crate::utils::ParallelConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Feature attribution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributionMethod {
    /// Monte-Carlo Shapley value approximation
    Shap,
    /// Weighted local linear surrogate
    Lime,
    /// Single-draw permutation importance
    Permutation,
}

impl AttributionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionMethod::Shap => "shap",
            AttributionMethod::Lime => "lime",
            AttributionMethod::Permutation => "permutation",
        }
    }
}

impl fmt::Display for AttributionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributionMethod {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shap" => Ok(AttributionMethod::Shap),
            "lime" => Ok(AttributionMethod::Lime),
            "permutation" => Ok(AttributionMethod::Permutation),
            other => Err(ExplainError::ConfigError(format!(
                "unknown explainability method '{}', expected one of: shap, lime, permutation",
                other
            ))),
        }
    }
}

/// What the engine explains and how much of it is reported
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainabilityConfig {
    /// Attribution strategy
    pub method: AttributionMethod,
    /// Features named in the reasoning paragraph
    pub max_features: usize,
    /// Whether to generate counterfactual alternatives
    pub include_alternatives: bool,
    /// Maximum number of alternatives returned
    pub max_alternatives: usize,
}

impl Default for ExplainabilityConfig {
    fn default() -> Self {
        Self {
            method: AttributionMethod::Shap,
            max_features: 5,
            include_alternatives: true,
            max_alternatives: 3,
        }
    }
}

/// Sample counts and numeric constants for the strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Monte-Carlo trials per feature
    pub shap_samples: usize,
    /// LIME neighbourhood size
    pub lime_samples: usize,
    /// Width of the LIME exponential kernel
    pub lime_kernel_width: f64,
    /// Half-width of the uniform LIME perturbation
    pub lime_noise: f64,
    /// Step applied to a feature when building counterfactuals
    pub counterfactual_step: f64,
    /// Ridge term added to the LIME normal equations
    pub ridge_lambda: f64,
    /// Ridge term for the single retry after a degenerate solve
    pub fallback_ridge_lambda: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            shap_samples: 100,
            lime_samples: 1000,
            lime_kernel_width: 0.75,
            lime_noise: 0.1,
            counterfactual_step: 0.2,
            ridge_lambda: 1e-6,
            fallback_ridge_lambda: 1e-3,
        }
    }
}

/// Execution settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Seed for reproducible sampling (None = seed from entropy)
    pub seed: Option<u64>,
    /// Maximum concurrent inference calls (None = rayon's global pool)
    pub max_concurrency: Option<usize>,
    /// Fan-outs smaller than this run on the calling thread
    pub min_parallel_len: Option<usize>,
    /// Per-call time budget in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub explainability: ExplainabilityConfig,
    pub sampling: SamplingConfig,
    pub runtime: RuntimeConfig,
}

impl EngineConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attribution method
    pub fn with_method(mut self, method: AttributionMethod) -> Self {
        self.explainability.method = method;
        self
    }

    /// Set the number of features named in the reasoning
    pub fn with_max_features(mut self, n: usize) -> Self {
        self.explainability.max_features = n;
        self
    }

    /// Enable/disable counterfactual alternatives
    pub fn with_alternatives(mut self, include: bool) -> Self {
        self.explainability.include_alternatives = include;
        self
    }

    /// Set Monte-Carlo trials per feature
    pub fn with_shap_samples(mut self, n: usize) -> Self {
        self.sampling.shap_samples = n;
        self
    }

    /// Set the LIME neighbourhood size
    pub fn with_lime_samples(mut self, n: usize) -> Self {
        self.sampling.lime_samples = n;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.runtime.seed = Some(seed);
        self
    }

    /// Bound concurrent inference calls
    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.runtime.max_concurrency = Some(n);
        self
    }

    /// Set a per-call time budget
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.runtime.timeout_ms = Some(ms);
        self
    }

    /// Parse from JSON and validate
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ExplainError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Worker pool settings derived from the runtime section
    pub fn parallel_config(&self) -> ParallelConfig {
        let mut parallel = ParallelConfig::new();
        parallel.n_threads = self.runtime.max_concurrency;
        if let Some(len) = self.runtime.min_parallel_len {
            parallel.min_parallel_len = len;
        }
        parallel
    }

    /// Check every value is usable
    pub fn validate(&self) -> Result<()> {
        let e = &self.explainability;
        let s = &self.sampling;

        if e.max_features == 0 {
            return Err(invalid("explainability.max_features", e.max_features, "must be > 0"));
        }
        if e.max_alternatives == 0 {
            return Err(invalid(
                "explainability.max_alternatives",
                e.max_alternatives,
                "must be > 0",
            ));
        }
        if s.shap_samples == 0 {
            return Err(invalid("sampling.shap_samples", s.shap_samples, "must be > 0"));
        }
        if s.lime_samples < 2 {
            return Err(invalid("sampling.lime_samples", s.lime_samples, "must be >= 2"));
        }
        if !(s.lime_kernel_width > 0.0) {
            return Err(invalid("sampling.lime_kernel_width", s.lime_kernel_width, "must be > 0"));
        }
        if !(s.lime_noise > 0.0 && s.lime_noise <= 1.0) {
            return Err(invalid("sampling.lime_noise", s.lime_noise, "must be in (0, 1]"));
        }
        if !(s.counterfactual_step > 0.0 && s.counterfactual_step <= 1.0) {
            return Err(invalid(
                "sampling.counterfactual_step",
                s.counterfactual_step,
                "must be in (0, 1]",
            ));
        }
        if !(s.ridge_lambda >= 0.0) {
            return Err(invalid("sampling.ridge_lambda", s.ridge_lambda, "must be >= 0"));
        }
        if !(s.fallback_ridge_lambda > s.ridge_lambda) {
            return Err(invalid(
                "sampling.fallback_ridge_lambda",
                s.fallback_ridge_lambda,
                "must exceed ridge_lambda",
            ));
        }
        if self.runtime.max_concurrency == Some(0) {
            return Err(invalid("runtime.max_concurrency", 0, "must be > 0"));
        }

        Ok(())
    }
}

fn invalid(name: &str, value: impl fmt::Display, reason: &str) -> ExplainError {
    ExplainError::ConfigError(format!("{} = {}: {}", name, value, reason))
}
