// src/llm/mod.rs

pub mod chat;
pub mod scripted;

pub use chat::ChatCompletionGateway;
pub use scripted::ScriptedGateway;

use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("model returned no usable completion")]
    EmptyResponse,
}

/// A chat-completion oracle. The only seam in the engine that touches the network.
///
/// One call, no retries: callers treat every error as a reason to fall back.
pub trait ModelGateway: Send + Sync {
    fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String, GatewayError>;

    /// Completion with an optional base64 image attached. Gateways that cannot
    /// send images ignore it.
    fn complete_with_image(
        &self,
        system: &str,
        user: &str,
        _image_b64: Option<&str>,
        max_tokens: u32,
    ) -> Result<String, GatewayError> {
        self.complete(system, user, max_tokens)
    }
}

impl<G: ModelGateway + ?Sized> ModelGateway for Arc<G> {
    fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String, GatewayError> {
        (**self).complete(system, user, max_tokens)
    }

    fn complete_with_image(
        &self,
        system: &str,
        user: &str,
        image_b64: Option<&str>,
        max_tokens: u32,
    ) -> Result<String, GatewayError> {
        (**self).complete_with_image(system, user, image_b64, max_tokens)
    }
}

impl<G: ModelGateway + ?Sized> ModelGateway for &G {
    fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String, GatewayError> {
        (**self).complete(system, user, max_tokens)
    }

    fn complete_with_image(
        &self,
        system: &str,
        user: &str,
        image_b64: Option<&str>,
        max_tokens: u32,
    ) -> Result<String, GatewayError> {
        (**self).complete_with_image(system, user, image_b64, max_tokens)
    }
}

/// Shared precondition check for every gateway implementation.
pub fn check_request(system: &str, user: &str, max_tokens: u32) -> Result<(), GatewayError> {
    if system.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("system prompt is empty".into()));
    }
    if user.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("user prompt is empty".into()));
    }
    if max_tokens == 0 {
        return Err(GatewayError::InvalidRequest("max_tokens must be positive".into()));
    }
    Ok(())
}
