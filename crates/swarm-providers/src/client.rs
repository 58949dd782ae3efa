//! Chat client facade — one model, prompt in, text out.
//!
//! Wraps an [`LlmProvider`] with per-client generation defaults so callers
//! only pass what differs per call.

use std::sync::Arc;

use swarm_core::config::schema::GenerationDefaults;
use swarm_core::types::{Completion, Message};
use swarm_usage::CallerChain;

use crate::error::Result;
use crate::registry::ProviderKind;
use crate::traits::{CompletionRequest, LlmProvider};

// ─────────────────────────────────────────────
// Prompt & options
// ─────────────────────────────────────────────

/// Input to a generation call.
#[derive(Clone, Debug, PartialEq)]
pub enum Prompt {
    /// Plain text, sent as a single user message.
    Text(String),
    /// A full conversation.
    Messages(Vec<Message>),
}

impl Prompt {
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            Prompt::Text(text) => vec![Message::user(text)],
            Prompt::Messages(messages) => messages,
        }
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::Text(text.to_string())
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Prompt::Text(text)
    }
}

impl From<Vec<Message>> for Prompt {
    fn from(messages: Vec<Message>) -> Self {
        Prompt::Messages(messages)
    }
}

/// Per-call overrides. Unset fields fall back to the client's defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub num_comps: Option<u32>,
    pub caller: Option<CallerChain>,
}

impl GenOptions {
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn num_comps(mut self, n: u32) -> Self {
        self.num_comps = Some(n);
        self
    }

    pub fn caller(mut self, caller: impl Into<CallerChain>) -> Self {
        self.caller = Some(caller.into());
        self
    }
}

// ─────────────────────────────────────────────
// ChatClient
// ─────────────────────────────────────────────

/// A model-bound client over any [`LlmProvider`].
#[derive(Clone)]
pub struct ChatClient {
    model: String,
    provider: Arc<dyn LlmProvider>,
    defaults: GenerationDefaults,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("model", &self.model)
            .field("provider", &self.provider.display_name())
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl ChatClient {
    pub fn new(
        model: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
        defaults: GenerationDefaults,
    ) -> Self {
        Self {
            model: model.into(),
            provider,
            defaults,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Backend this client's model routes to.
    pub fn provider_kind(&self) -> ProviderKind {
        ProviderKind::for_model(&self.model)
    }

    pub fn defaults(&self) -> &GenerationDefaults {
        &self.defaults
    }

    /// Merge `options` over the client defaults.
    pub fn build_request(&self, prompt: Prompt, options: GenOptions) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: prompt.into_messages(),
            max_tokens: options.max_tokens.unwrap_or(self.defaults.max_tokens),
            temperature: options.temperature.unwrap_or(self.defaults.temperature),
            completion_count: options.num_comps.unwrap_or(self.defaults.num_completions),
            caller: options.caller.unwrap_or_default(),
        }
    }

    /// Generate on the blocking path.
    pub fn gen(&self, prompt: impl Into<Prompt>, options: GenOptions) -> Result<Completion> {
        let request = self.build_request(prompt.into(), options);
        self.provider.complete(&request)
    }

    /// Generate on the async path.
    pub async fn agen(&self, prompt: impl Into<Prompt>, options: GenOptions) -> Result<Completion> {
        let request = self.build_request(prompt.into(), options);
        self.provider.complete_async(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every request and answers with a fixed text per completion.
    struct MockProvider {
        answer: String,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl MockProvider {
        fn new(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last(&self) -> CompletionRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }

        fn respond(&self, request: &CompletionRequest) -> Result<Completion> {
            self.seen.lock().unwrap().push(request.clone());
            if request.model == "broken" {
                return Err(LlmError::Transport("down".into()));
            }
            Ok(match request.completion_count {
                1 => Completion::Single(self.answer.clone()),
                n => Completion::Multiple(vec![self.answer.clone(); n as usize]),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn complete_async(&self, request: &CompletionRequest) -> Result<Completion> {
            self.respond(request)
        }

        fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
            self.respond(request)
        }

        fn display_name(&self) -> &str {
            "MockProvider"
        }
    }

    fn client(model: &str, provider: &Arc<MockProvider>) -> ChatClient {
        ChatClient::new(model, provider.clone(), GenerationDefaults::default())
    }

    #[test]
    fn test_text_prompt_becomes_user_message() {
        let messages = Prompt::from("hello").into_messages();
        assert_eq!(messages, vec![Message::user("hello")]);
    }

    #[test]
    fn test_build_request_uses_defaults() {
        let provider = Arc::new(MockProvider::new("x"));
        let request = client("gpt-4o-mini", &provider).build_request("hi".into(), GenOptions::default());

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.max_tokens, 1000);
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.completion_count, 1);
        assert!(request.caller.is_empty());
    }

    #[test]
    fn test_options_override_defaults() {
        let provider = Arc::new(MockProvider::new("x"));
        let options = GenOptions::default()
            .max_tokens(64)
            .temperature(0.9)
            .num_comps(2)
            .caller("Debate.execute");
        let request = client("gpt-4", &provider).build_request("hi".into(), options);

        assert_eq!(request.max_tokens, 64);
        assert_eq!(request.temperature, 0.9);
        assert_eq!(request.completion_count, 2);
        assert_eq!(request.caller.label(), "Debate.execute");
    }

    #[test]
    fn test_gen_blocking() {
        let provider = Arc::new(MockProvider::new("sync"));
        let completion = client("gpt-4", &provider)
            .gen("question", GenOptions::default())
            .unwrap();

        assert_eq!(completion, Completion::Single("sync".into()));
        assert_eq!(provider.last().messages, vec![Message::user("question")]);
    }

    #[tokio::test]
    async fn test_agen_with_messages_and_multiple_completions() {
        let provider = Arc::new(MockProvider::new("async"));
        let messages = vec![Message::system("be brief"), Message::user("why?")];
        let completion = client("llama3", &provider)
            .agen(messages.clone(), GenOptions::default().num_comps(3))
            .await
            .unwrap();

        assert_eq!(completion.len(), 3);
        assert_eq!(provider.last().messages, messages);
    }

    #[tokio::test]
    async fn test_agen_propagates_errors() {
        let provider = Arc::new(MockProvider::new("x"));
        let err = client("broken", &provider)
            .agen("hi", GenOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }

    #[test]
    fn test_provider_kind() {
        let provider = Arc::new(MockProvider::new("x"));
        assert_eq!(client("gpt-4o-mini", &provider).provider_kind(), ProviderKind::OpenAi);
        assert_eq!(client("lmstudio", &provider).provider_kind(), ProviderKind::LmStudio);
        assert_eq!(client("phi3", &provider).provider_kind(), ProviderKind::Ollama);
    }
}
