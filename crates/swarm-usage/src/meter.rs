//! Cost meter — prices a provider response and writes it to the ledger.
//!
//! Metering never fails a call. Absent or malformed usage data and models
//! without a price are reported as [`MeteringDegraded`] in the log and
//! recorded with zero cost.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use swarm_core::types::{ChatCompletionResponse, TokenUsage};
use thiserror::Error;
use tracing::{debug, warn};

use crate::caller::CallerChain;
use crate::ledger::{UsageLedger, UsageRecord};
use crate::pricing::{ModelFamily, PriceLookup, PricingTable};

// ─────────────────────────────────────────────
// Degradation reasons
// ─────────────────────────────────────────────

/// Why a call was metered with less than full information. Logged, never returned
/// to the caller of a completion.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeteringDegraded {
    #[error("response carries no usage data")]
    MissingUsage,

    #[error("malformed usage data: {0}")]
    MalformedUsage(String),

    #[error("no price listed for '{model}' in family {family}")]
    UnpricedModel { model: String, family: ModelFamily },
}

// ─────────────────────────────────────────────
// Usage sources
// ─────────────────────────────────────────────

/// Anything that can report token usage.
///
/// Typed responses expose usage as a field; raw JSON bodies carry it as a
/// nested `usage` mapping. Both are accepted.
pub trait UsageSource {
    fn token_usage(&self) -> Result<TokenUsage, MeteringDegraded>;
}

impl UsageSource for ChatCompletionResponse {
    fn token_usage(&self) -> Result<TokenUsage, MeteringDegraded> {
        parse_usage(self.usage.as_ref())
    }
}

impl UsageSource for TokenUsage {
    fn token_usage(&self) -> Result<TokenUsage, MeteringDegraded> {
        Ok(*self)
    }
}

impl UsageSource for serde_json::Value {
    fn token_usage(&self) -> Result<TokenUsage, MeteringDegraded> {
        parse_usage(self.get("usage"))
    }
}

/// Read `{prompt_tokens, completion_tokens}` from a provider usage block.
fn parse_usage(usage: Option<&serde_json::Value>) -> Result<TokenUsage, MeteringDegraded> {
    let usage = match usage {
        None | Some(serde_json::Value::Null) => return Err(MeteringDegraded::MissingUsage),
        Some(usage) => usage,
    };

    let field = |name: &str| {
        usage.get(name).and_then(serde_json::Value::as_u64).ok_or_else(|| {
            MeteringDegraded::MalformedUsage(format!("missing or non-integer '{name}'"))
        })
    };

    let prompt_tokens = field("prompt_tokens")?;
    let completion_tokens = field("completion_tokens")?;
    Ok(TokenUsage {
        prompt_tokens,
        completion_tokens,
        total_tokens: prompt_tokens + completion_tokens,
    })
}

// ─────────────────────────────────────────────
// CostMeter
// ─────────────────────────────────────────────

/// What the meter recorded for one call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Metered {
    pub cost: f64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Prices responses and appends them to a shared [`UsageLedger`].
#[derive(Clone, Debug)]
pub struct CostMeter {
    ledger: Arc<UsageLedger>,
    pricing: PricingTable,
}

impl CostMeter {
    pub fn new(ledger: Arc<UsageLedger>) -> Self {
        Self {
            ledger,
            pricing: PricingTable::default(),
        }
    }

    /// Replace the built-in price list.
    pub fn with_pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn ledger(&self) -> &Arc<UsageLedger> {
        &self.ledger
    }

    /// Price `usage` for `model` without touching the ledger.
    pub fn price(&self, model: &str, usage: TokenUsage) -> Metered {
        let tokens = |cost| Metered {
            cost,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        };

        match self.pricing.lookup(model) {
            PriceLookup::Priced(entry) => {
                tokens(entry.cost(usage.prompt_tokens, usage.completion_tokens))
            }
            PriceLookup::Unlisted(family) => {
                let reason = MeteringDegraded::UnpricedModel {
                    model: model.to_string(),
                    family,
                };
                warn!(model, reason = %reason, "metering degraded");
                tokens(0.0)
            }
            // Image pricing is per resolution, not per token.
            PriceLookup::ImageGeneration => Metered::default(),
            PriceLookup::Unknown => {
                debug!(model, "no pricing family, recording tokens at zero cost");
                tokens(0.0)
            }
        }
    }

    /// Meter one completed call and append it to the ledger.
    pub fn record(
        &self,
        source: &dyn UsageSource,
        model: &str,
        caller: &CallerChain,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Metered {
        let usage = source.token_usage().unwrap_or_else(|reason| {
            warn!(model, caller = %caller, reason = %reason, "metering degraded");
            TokenUsage::default()
        });

        let metered = self.price(model, usage);
        self.ledger.append(UsageRecord {
            caller_chain: caller.label(),
            start_time,
            end_time,
            model: model.to_string(),
            prompt_tokens: metered.prompt_tokens,
            completion_tokens: metered.completion_tokens,
            cost: metered.cost,
            success: true,
        });

        debug!(
            model,
            caller = %caller,
            prompt_tokens = metered.prompt_tokens,
            completion_tokens = metered.completion_tokens,
            cost = metered.cost,
            "usage recorded"
        );
        metered
    }

    /// Record a call that failed after exhausting its attempts.
    pub fn record_failure(
        &self,
        model: &str,
        caller: &CallerChain,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) {
        self.ledger.append(UsageRecord {
            caller_chain: caller.label(),
            start_time,
            end_time,
            model: model.to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
            cost: 0.0,
            success: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meter() -> CostMeter {
        CostMeter::new(Arc::new(UsageLedger::new()))
    }

    fn typed_response(prompt: u64, completion: u64) -> ChatCompletionResponse {
        serde_json::from_value(json!({
            "choices": [{"message": {"content": "ok"}}],
            "usage": {"prompt_tokens": prompt, "completion_tokens": completion, "total_tokens": prompt + completion}
        }))
        .unwrap()
    }

    #[test]
    fn test_gpt4o_mini_pricing() {
        let meter = meter();
        let now = Utc::now();
        let metered = meter.record(
            &typed_response(1000, 500),
            "gpt-4o-mini",
            &CallerChain::default(),
            now,
            now,
        );

        assert!((metered.cost - 0.00045).abs() < 1e-12);
        assert_eq!(metered.prompt_tokens, 1000);
        assert_eq!(metered.completion_tokens, 500);
        assert!((meter.ledger().totals().cost - 0.00045).abs() < 1e-12);
    }

    #[test]
    fn test_mapping_form_matches_attribute_form() {
        let meter = meter();
        let now = Utc::now();
        let raw = json!({
            "choices": [{"message": {"content": "ok"}}],
            "usage": {"prompt_tokens": 1000, "completion_tokens": 500}
        });

        let from_json = meter.record(&raw, "gpt-4", &CallerChain::default(), now, now);
        let from_typed = meter.record(&typed_response(1000, 500), "gpt-4", &CallerChain::default(), now, now);

        assert_eq!(from_json, from_typed);
        assert!((from_json.cost - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_model_records_tokens_at_zero_cost() {
        let meter = meter();
        let now = Utc::now();
        let metered = meter.record(&typed_response(42, 7), "llama3", &CallerChain::default(), now, now);

        assert_eq!(metered.cost, 0.0);
        assert_eq!(metered.prompt_tokens, 42);
        assert_eq!(metered.completion_tokens, 7);

        let records = meter.ledger().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].model, "llama3");
        assert!(records[0].success);
    }

    #[test]
    fn test_unlisted_family_member_records_zero_cost() {
        let meter = meter();
        let metered = meter.price("gpt-4o", TokenUsage { prompt_tokens: 5, completion_tokens: 5, total_tokens: 10 });
        assert_eq!(metered.cost, 0.0);
        assert_eq!(metered.prompt_tokens, 5);
    }

    #[test]
    fn test_image_generation_is_zero() {
        let meter = meter();
        let metered = meter.price("dall-e-3", TokenUsage { prompt_tokens: 5, completion_tokens: 5, total_tokens: 10 });
        assert_eq!(metered, Metered::default());
    }

    #[test]
    fn test_missing_usage_still_records() {
        let meter = meter();
        let now = Utc::now();
        let raw = json!({"choices": [{"message": {"content": "ok"}}]});
        let metered = meter.record(&raw, "gpt-4o-mini", &CallerChain::default(), now, now);

        assert_eq!(metered, Metered::default());
        assert_eq!(meter.ledger().len(), 1);
    }

    #[test]
    fn test_malformed_usage_is_degraded_not_fatal() {
        let raw = json!({"usage": {"prompt_tokens": "many", "completion_tokens": 3}});
        assert!(matches!(raw.token_usage(), Err(MeteringDegraded::MalformedUsage(_))));

        let meter = meter();
        let now = Utc::now();
        let metered = meter.record(&raw, "gpt-4", &CallerChain::default(), now, now);
        assert_eq!(metered, Metered::default());
    }

    #[test]
    fn test_typed_response_with_partial_usage_is_degraded() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "ok"}}],
            "usage": {"total_tokens": 12}
        }))
        .unwrap();
        assert!(matches!(response.token_usage(), Err(MeteringDegraded::MalformedUsage(_))));

        let meter = meter();
        let now = Utc::now();
        let metered = meter.record(&response, "gpt-4", &CallerChain::default(), now, now);
        assert_eq!(metered, Metered::default());
        assert_eq!(meter.ledger().len(), 1);
    }

    #[test]
    fn test_caller_chain_is_recorded() {
        let meter = meter();
        let now = Utc::now();
        let caller = CallerChain::new("Reflect.execute").then("Graph.run");
        meter.record(&typed_response(1, 1), "gpt-4", &caller, now, now);

        assert_eq!(meter.ledger().records()[0].caller_chain, "Reflect.execute->Graph.run");
    }

    #[test]
    fn test_failure_record() {
        let meter = meter();
        let now = Utc::now();
        meter.record_failure("gpt-4", &CallerChain::new("Node.run"), now, now);

        let records = meter.ledger().records();
        assert_eq!(records.len(), 1);
        assert!(!records[0].success);
        assert_eq!(meter.ledger().totals().cost, 0.0);
    }
}
