//! Completion provider trait — the seam between callers and backends.
//!
//! [`Dispatcher`](crate::dispatcher::Dispatcher) is the production
//! implementation; tests substitute their own.

use async_trait::async_trait;
use swarm_core::config::schema::GenerationDefaults;
use swarm_core::types::{Completion, Message};
use swarm_usage::CallerChain;

use crate::error::{LlmError, Result};

/// One completion call: model, conversation, and sampling settings.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier; also selects the backend.
    pub model: String,
    /// Conversation in chronological order.
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Number of completions (`n` on the wire). At least 1.
    pub completion_count: u32,
    /// Attribution tag recorded with the usage.
    pub caller: CallerChain,
}

impl CompletionRequest {
    /// A request using the stock generation defaults.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        let defaults = GenerationDefaults::default();
        Self {
            model: model.into(),
            messages,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            completion_count: defaults.num_completions,
            caller: CallerChain::default(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_completion_count(mut self, n: u32) -> Self {
        self.completion_count = n;
        self
    }

    pub fn with_caller(mut self, caller: CallerChain) -> Self {
        self.caller = caller;
        self
    }

    /// Whether the first message is the disabled-turn marker.
    pub fn is_skipped(&self) -> bool {
        self.messages.first().is_some_and(Message::is_skip_marker)
    }

    /// Reject requests no backend could serve.
    pub fn validate(&self) -> Result<()> {
        if self.completion_count == 0 {
            return Err(LlmError::Configuration(
                "completion count must be at least 1".into(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(LlmError::Configuration("max_tokens must be positive".into()));
        }
        if self.messages.is_empty() {
            return Err(LlmError::Configuration("request has no messages".into()));
        }
        Ok(())
    }
}

/// A chat completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a request on the async path (retried per the provider's policy).
    async fn complete_async(&self, request: &CompletionRequest) -> Result<Completion>;

    /// Complete a request on the blocking path. Must not be called from
    /// inside an async runtime.
    fn complete(&self, request: &CompletionRequest) -> Result<Completion>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
