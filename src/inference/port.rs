//! The model boundary

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Size summary of the model behind a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelArchitecture {
    /// Total number of trainable parameters
    pub parameter_count: u64,
    /// Number of layers (or stages) in the model
    pub layer_count: u32,
}

impl ModelArchitecture {
    pub fn new(parameter_count: u64, layer_count: u32) -> Self {
        Self {
            parameter_count,
            layer_count,
        }
    }
}

/// An opaque trained model.
///
/// `infer` may block (remote call, accelerator queue); the engine calls it
/// from worker threads and never assumes the output length equals the input
/// length.
pub trait InferencePort: Send + Sync {
    /// Run the model on one feature vector
    fn infer(&self, features: &[f64]) -> Result<Vec<f64>>;

    /// Version string recorded in explanation metadata
    fn version(&self) -> Option<String> {
        None
    }

    /// Parameter and layer counts, if the model exposes them
    fn architecture(&self) -> Option<ModelArchitecture> {
        None
    }
}

impl<F> InferencePort for F
where
    F: Fn(&[f64]) -> Result<Vec<f64>> + Send + Sync,
{
    fn infer(&self, features: &[f64]) -> Result<Vec<f64>> {
        self(features)
    }
}

/// Attaches a version and architecture to any port, typically a closure
pub struct DescribedModel<M> {
    inner: M,
    version: Option<String>,
    architecture: Option<ModelArchitecture>,
}

impl<M: InferencePort> DescribedModel<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            version: None,
            architecture: None,
        }
    }

    /// Set the reported model version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the reported architecture
    pub fn with_architecture(mut self, parameter_count: u64, layer_count: u32) -> Self {
        self.architecture = Some(ModelArchitecture::new(parameter_count, layer_count));
        self
    }
}

impl<M: InferencePort> InferencePort for DescribedModel<M> {
    fn infer(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.inner.infer(features)
    }

    fn version(&self) -> Option<String> {
        self.version.clone().or_else(|| self.inner.version())
    }

    fn architecture(&self) -> Option<ModelArchitecture> {
        self.architecture.or_else(|| self.inner.architecture())
    }
}
