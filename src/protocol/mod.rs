// src/protocol/mod.rs

pub mod navigator;
pub mod planner;
pub mod vision;

pub use navigator::{LlmNavigator, Navigator};
pub use planner::{HeuristicPlanner, LlmPlanner, Planner};
pub use vision::{LlmVisionNavigator, VisionNavigator};

use crate::extract::ExtractError;
use crate::llm::GatewayError;
use crate::validation::SchemaViolation;
use thiserror::Error;

/// Why the model path gave up and the heuristic took over.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FallbackReason {
    #[error("model gateway failed: {0}")]
    Gateway(#[from] GatewayError),
    #[error("model output unusable: {0}")]
    Extract(#[from] ExtractError),
    #[error("model output violated the schema: {0:?}")]
    Schema(Vec<SchemaViolation>),
}

/// Result of one model-path attempt. Never reaches callers: orchestrators
/// turn `NeedsFallback` into a heuristic result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ready(T),
    NeedsFallback(FallbackReason),
}

impl<T> Outcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::NeedsFallback(_) => None,
        }
    }

    /// Resolve to a value, invoking `fallback` only when the model path failed.
    pub fn or_fallback(self, fallback: impl FnOnce(FallbackReason) -> T) -> T {
        match self {
            Outcome::Ready(value) => value,
            Outcome::NeedsFallback(reason) => fallback(reason),
        }
    }
}

impl<T> From<Result<T, FallbackReason>> for Outcome<T> {
    fn from(result: Result<T, FallbackReason>) -> Self {
        match result {
            Ok(value) => Outcome::Ready(value),
            Err(reason) => Outcome::NeedsFallback(reason),
        }
    }
}

/// Log repair hints at debug level.
pub(crate) fn log_violations(component: &str, violations: &[SchemaViolation]) {
    for violation in violations {
        let (msg, hint) = violation.hint();
        match hint {
            Some(hint) => tracing::debug!(component, %hint, "repaired: {msg}"),
            None => tracing::debug!(component, "repaired: {msg}"),
        }
    }
}
