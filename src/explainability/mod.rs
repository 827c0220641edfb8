//! Model explainability module
//!
//! Explains predictions of an opaque model through its inference port:
//! - Feature attribution (Monte-Carlo SHAP, LIME, permutation importance)
//! - Natural-language reasoning
//! - Single-feature counterfactual alternatives
//! - Global behavior analysis over a batch
//! - Validation of explanations against expected outcomes

mod attribution;
mod behavior;
mod config;
mod counterfactual;
mod engine;
mod importance;
mod lime;
mod permutation;
mod reasoning;
mod result;
mod shap;
mod validation;

pub use attribution::{check_instance, strategy_for, AttributionStrategy};
pub use behavior::{
    behavior_recommendations, interpretability_score, Complexity, GlobalImportanceAccumulator,
    ModelBehaviorReport, GLOBAL_TOP_K, NEGLIGIBLE_IMPORTANCE,
};
pub use config::{
    AttributionMethod, EngineConfig, ExplainabilityConfig, RuntimeConfig, SamplingConfig,
};
pub use counterfactual::CounterfactualGenerator;
pub use engine::ExplainabilityEngine;
pub use importance::{is_ranked, rank_importances, top_k_sum, Contribution, FeatureImportance};
pub use lime::{LimeExplainer, LocalSurrogate};
pub use permutation::PermutationImportance;
pub use reasoning::synthesize_reasoning;
pub use result::{AlternativeOutcome, ExplainableResult, Explanation, ExplanationMetadata};
pub use shap::ShapSampler;
pub use validation::{ExplanationValidator, ValidationReport, ValidationResult};
