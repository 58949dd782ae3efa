//! Completion dispatcher for OpenAI-compatible APIs.
//!
//! Resolves the endpoint for a model, sends one `/chat/completions` request,
//! meters the response into the shared ledger, and normalizes the choices.
//!
//! Two entry points share that pipeline:
//! - [`Dispatcher::complete_async`] — tokio, wrapped in the [`RetryPolicy`]
//! - [`Dispatcher::complete`] — `reqwest::blocking`, a single attempt

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use swarm_core::config::Config;
use swarm_core::types::{ChatCompletionRequest, ChatCompletionResponse, Completion};
use swarm_usage::{CostMeter, UsageLedger};

use crate::credentials::CredentialPool;
use crate::error::{ErrorKind, LlmError, Result};
use crate::registry::{EndpointResolver, ResolvedEndpoint};
use crate::retry::RetryPolicy;
use crate::traits::{CompletionRequest, LlmProvider};

// ─────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────

/// Sends completion requests to whichever backend the model selects.
pub struct Dispatcher {
    /// Async HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// Blocking client, built on first sync call so async-only users never
    /// spin up its internal runtime.
    blocking: OnceLock<reqwest::blocking::Client>,
    http_timeout: Duration,
    resolver: EndpointResolver,
    retry: RetryPolicy,
    meter: CostMeter,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("resolver", &self.resolver)
            .field("retry", &self.retry)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher with the default retry policy.
    ///
    /// `http_timeout` bounds blocking calls only. Async attempts are bounded
    /// by the retry policy's per-attempt deadline.
    pub fn new(resolver: EndpointResolver, meter: CostMeter, http_timeout: Duration) -> Self {
        Dispatcher {
            client: reqwest::Client::new(),
            blocking: OnceLock::new(),
            http_timeout,
            resolver,
            retry: RetryPolicy::default(),
            meter,
        }
    }

    /// Build a dispatcher from loaded configuration.
    ///
    /// `ledger` is the application's shared usage ledger.
    pub fn from_config(
        config: &Config,
        credentials: CredentialPool,
        ledger: Arc<UsageLedger>,
    ) -> Self {
        let resolver = EndpointResolver::new(config.endpoints.clone(), credentials);
        Dispatcher::new(
            resolver,
            CostMeter::new(ledger),
            Duration::from_secs(config.http.timeout_secs),
        )
        .with_retry_policy(RetryPolicy::from(&config.retry))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn ledger(&self) -> &Arc<UsageLedger> {
        self.meter.ledger()
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn blocking_client(&self) -> &reqwest::blocking::Client {
        self.blocking.get_or_init(|| {
            reqwest::blocking::Client::builder()
                .timeout(self.http_timeout)
                .build()
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Failed to configure blocking HTTP client, using defaults");
                    reqwest::blocking::Client::new()
                })
        })
    }

    /// Complete `request` on the async path, retrying per the policy.
    pub async fn complete_async(&self, request: &CompletionRequest) -> Result<Completion> {
        if request.is_skipped() {
            debug!(model = %request.model, "Skip marker, no request sent");
            return Ok(Completion::empty());
        }
        request.validate()?;

        let start = Utc::now();
        let result = self
            .retry
            .run(move |attempt| self.send_async(request, attempt))
            .await;
        self.finish(request, result, start, Utc::now())
    }

    /// Complete `request` on the blocking path. One attempt; errors propagate.
    ///
    /// Must not be called from inside an async runtime.
    pub fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        if request.is_skipped() {
            debug!(model = %request.model, "Skip marker, no request sent");
            return Ok(Completion::empty());
        }
        request.validate()?;

        let start = Utc::now();
        let result = self.send_blocking(request);
        self.finish(request, result, start, Utc::now())
    }

    // ── Single attempts ──

    fn prepare(&self, request: &CompletionRequest, attempt: u32) -> Result<ResolvedEndpoint> {
        let endpoint = self.resolver.resolve(&request.model)?;
        debug!(
            provider = endpoint.kind.display_name(),
            model = %request.model,
            messages = request.messages.len(),
            n = request.completion_count,
            attempt,
            "Calling LLM"
        );
        Ok(endpoint)
    }

    async fn send_async(
        &self,
        request: &CompletionRequest,
        attempt: u32,
    ) -> Result<ChatCompletionResponse> {
        let endpoint = self.prepare(request, attempt)?;
        let body = wire_body(request);

        let mut builder = self.client.post(endpoint.completions_url()).json(&body);
        if let Some(key) = &endpoint.credential {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(provider_error(&endpoint, status, text));
        }

        let parsed = response.json::<ChatCompletionResponse>().await?;
        ensure_choices(parsed)
    }

    fn send_blocking(&self, request: &CompletionRequest) -> Result<ChatCompletionResponse> {
        let endpoint = self.prepare(request, 1)?;
        let body = wire_body(request);

        let mut builder = self
            .blocking_client()
            .post(endpoint.completions_url())
            .json(&body);
        if let Some(key) = &endpoint.credential {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().map_err(|e| self.blocking_error(e))?;
        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(provider_error(&endpoint, status, text));
        }

        let parsed = response
            .json::<ChatCompletionResponse>()
            .map_err(|e| self.blocking_error(e))?;
        ensure_choices(parsed)
    }

    /// The blocking client's own timeout is the deadline on that path.
    fn blocking_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.http_timeout)
        } else {
            e.into()
        }
    }

    /// Meter the outcome and normalize a successful response.
    fn finish(
        &self,
        request: &CompletionRequest,
        result: Result<ChatCompletionResponse>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Completion> {
        match result {
            Ok(response) => {
                self.meter
                    .record(&response, &request.model, &request.caller, start, end);
                Ok(normalize(response, request.completion_count))
            }
            Err(err) => {
                if err.kind() != ErrorKind::Configuration {
                    self.meter
                        .record_failure(&request.model, &request.caller, start, end);
                }
                error!(model = %request.model, error = %err, "Completion failed");
                Err(err)
            }
        }
    }
}

#[async_trait]
impl LlmProvider for Dispatcher {
    async fn complete_async(&self, request: &CompletionRequest) -> Result<Completion> {
        Dispatcher::complete_async(self, request).await
    }

    fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        Dispatcher::complete(self, request)
    }

    fn display_name(&self) -> &str {
        "Dispatcher"
    }
}

// ─────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────

fn wire_body(request: &CompletionRequest) -> ChatCompletionRequest<'_> {
    ChatCompletionRequest::new(
        &request.model,
        &request.messages,
        request.max_tokens,
        request.temperature,
        request.completion_count,
    )
}

fn provider_error(
    endpoint: &ResolvedEndpoint,
    status: reqwest::StatusCode,
    body: String,
) -> LlmError {
    error!(
        provider = endpoint.kind.display_name(),
        status = %status,
        body = %body,
        "API error"
    );
    LlmError::Provider {
        status: status.as_u16(),
        body,
    }
}

fn ensure_choices(response: ChatCompletionResponse) -> Result<ChatCompletionResponse> {
    if response.choices.is_empty() {
        return Err(LlmError::MalformedResponse(
            "response contains no choices".into(),
        ));
    }
    Ok(response)
}

/// `n == 1` yields the first choice text; otherwise every choice in provider order.
fn normalize(response: ChatCompletionResponse, n: u32) -> Completion {
    let texts = response.texts();
    if texts.len() != n as usize {
        warn!(requested = n, received = texts.len(), "Provider returned a different number of choices");
    }

    if n == 1 {
        Completion::Single(texts.into_iter().next().unwrap_or_default())
    } else {
        Completion::Multiple(texts)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
