//! Schema-constrained text generation
//!
//! The generator is the only suspension point of a request.
//! Implementations submit a prompt plus a JSON schema and hand back
//! whatever the service produced, parsed or raw.

use crate::error::RoiError;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

pub mod openai;
pub use openai::OpenAiClient;

/// A single structured generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Role and rules block.
    pub instructions: String,
    /// Per-request data block.
    pub input: String,
    pub schema_name: &'static str,
    pub schema: Value,
}

/// What came back from the service. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReply {
    /// Structured value already parsed by the transport.
    pub parsed: Option<Value>,
    /// Raw text payload.
    pub text: Option<String>,
}

/// Trait for schema-constrained generation (network controlled)
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Model identifier reported back to callers.
    fn model(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply>;
}

/// Fixture generator for development & testing
/// Keeps the pipeline runnable without a network dependency
pub struct FixtureGenerator {
    model: String,
    reply: std::result::Result<GenerationReply, String>,
    calls: AtomicUsize,
}

impl FixtureGenerator {
    /// Always answer with an already-parsed value.
    pub fn parsed(payload: Value) -> Self {
        Self::with_reply(Ok(GenerationReply {
            parsed: Some(payload),
            text: None,
        }))
    }

    /// Always answer with raw text.
    pub fn text(payload: impl Into<String>) -> Self {
        Self::with_reply(Ok(GenerationReply {
            parsed: None,
            text: Some(payload.into()),
        }))
    }

    /// Always fail the call with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(Err(message.into()))
    }

    pub fn with_reply(reply: std::result::Result<GenerationReply, String>) -> Self {
        Self {
            model: "fixture".to_string(),
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NarrativeGenerator for FixtureGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<GenerationReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .map_err(RoiError::GenerationError)
    }
}
