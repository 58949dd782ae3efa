//! Model pricing — static per-1k-token prices for the hosted OpenAI models.
//!
//! Prices are grouped into model families. Lookup first classifies a model id
//! into a family (by substring, most specific first), then looks the exact id
//! up inside that family.

use serde::Serialize;

// ─────────────────────────────────────────────
// Model families
// ─────────────────────────────────────────────

/// Pricing family of a model identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelFamily {
    /// `gpt-4o*` — optimized/mini tier.
    Gpt4o,
    /// `gpt-4*`
    Gpt4,
    /// `gpt-3.5*`
    Gpt35,
    /// `dall-e*` — image generation, priced per image rather than per token.
    DallE,
    /// Anything else (local models, unlisted providers).
    Other,
}

impl ModelFamily {
    /// Classify a model id. Order matters: `gpt-4o` must win over `gpt-4`.
    pub fn of(model: &str) -> Self {
        if model.contains("gpt-4o") {
            ModelFamily::Gpt4o
        } else if model.contains("gpt-4") {
            ModelFamily::Gpt4
        } else if model.contains("gpt-3.5") {
            ModelFamily::Gpt35
        } else if model.contains("dall-e") {
            ModelFamily::DallE
        } else {
            ModelFamily::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::Gpt4o => "gpt-4o",
            ModelFamily::Gpt4 => "gpt-4",
            ModelFamily::Gpt35 => "gpt-3.5",
            ModelFamily::DallE => "dall-e",
            ModelFamily::Other => "other",
        }
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────
// Pricing entries
// ─────────────────────────────────────────────

/// Price of one model, in USD per 1000 tokens.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PricingEntry {
    pub model_family: ModelFamily,
    pub model_id: &'static str,
    pub input_price_per_1k: f64,
    pub output_price_per_1k: f64,
    pub context_window: u32,
}

impl PricingEntry {
    /// `prompt · in/1000 + completion · out/1000`
    pub fn cost(&self, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        prompt_tokens as f64 * self.input_price_per_1k / 1000.0
            + completion_tokens as f64 * self.output_price_per_1k / 1000.0
    }
}

const fn entry(
    model_family: ModelFamily,
    model_id: &'static str,
    input_price_per_1k: f64,
    output_price_per_1k: f64,
    context_window: u32,
) -> PricingEntry {
    PricingEntry {
        model_family,
        model_id,
        input_price_per_1k,
        output_price_per_1k,
        context_window,
    }
}

/// Built-in price list.
pub static PRICING: &[PricingEntry] = &[
    // gpt-4o
    entry(ModelFamily::Gpt4o, "gpt-4o-mini", 0.00015, 0.0006, 128_000),
    // gpt-4
    entry(ModelFamily::Gpt4, "gpt-4-0125-preview", 0.01, 0.03, 128_000),
    entry(ModelFamily::Gpt4, "gpt-4-1106-preview", 0.01, 0.03, 128_000),
    entry(ModelFamily::Gpt4, "gpt-4-vision-preview", 0.01, 0.03, 128_000),
    entry(ModelFamily::Gpt4, "gpt-4", 0.03, 0.06, 8_192),
    entry(ModelFamily::Gpt4, "gpt-4-0314", 0.03, 0.06, 8_192),
    entry(ModelFamily::Gpt4, "gpt-4-32k", 0.06, 0.12, 32_768),
    entry(ModelFamily::Gpt4, "gpt-4-32k-0314", 0.06, 0.12, 32_768),
    entry(ModelFamily::Gpt4, "gpt-4-0613", 0.06, 0.12, 8_192),
    // gpt-3.5
    entry(ModelFamily::Gpt35, "gpt-3.5-turbo-0125", 0.0010, 0.0020, 16_385),
    entry(ModelFamily::Gpt35, "gpt-3.5-turbo-1106", 0.0010, 0.0020, 16_385),
    entry(ModelFamily::Gpt35, "gpt-3.5-turbo-instruct", 0.0015, 0.0020, 4_096),
    entry(ModelFamily::Gpt35, "gpt-3.5-turbo", 0.0015, 0.0020, 4_096),
    entry(ModelFamily::Gpt35, "gpt-3.5-turbo-0301", 0.0015, 0.0020, 4_096),
    entry(ModelFamily::Gpt35, "gpt-3.5-turbo-0613", 0.0015, 0.0020, 16_384),
    entry(ModelFamily::Gpt35, "gpt-3.5-turbo-16k-0613", 0.0015, 0.0020, 16_384),
];

// ─────────────────────────────────────────────
// Lookup
// ─────────────────────────────────────────────

/// Result of a price lookup.
#[derive(Clone, Debug, PartialEq)]
pub enum PriceLookup<'a> {
    /// Exact model id found in its family.
    Priced(&'a PricingEntry),
    /// Family recognized, but this exact id has no price.
    Unlisted(ModelFamily),
    /// Image generation — no per-token marginal cost.
    ImageGeneration,
    /// No known family.
    Unknown,
}

/// Immutable pricing table.
#[derive(Clone, Copy, Debug)]
pub struct PricingTable {
    entries: &'static [PricingEntry],
}

impl Default for PricingTable {
    fn default() -> Self {
        Self { entries: PRICING }
    }
}

impl PricingTable {
    /// Use a custom price list.
    pub fn from_static(entries: &'static [PricingEntry]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [PricingEntry] {
        self.entries
    }

    /// Look up the price for `model`.
    pub fn lookup(&self, model: &str) -> PriceLookup<'static> {
        let family = ModelFamily::of(model);
        match family {
            ModelFamily::DallE => PriceLookup::ImageGeneration,
            ModelFamily::Other => PriceLookup::Unknown,
            _ => self
                .entries
                .iter()
                .find(|e| e.model_family == family && e.model_id == model)
                .map(PriceLookup::Priced)
                .unwrap_or(PriceLookup::Unlisted(family)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_priority() {
        assert_eq!(ModelFamily::of("gpt-4o-mini"), ModelFamily::Gpt4o);
        assert_eq!(ModelFamily::of("gpt-4-32k"), ModelFamily::Gpt4);
        assert_eq!(ModelFamily::of("gpt-3.5-turbo"), ModelFamily::Gpt35);
        assert_eq!(ModelFamily::of("dall-e-3"), ModelFamily::DallE);
        assert_eq!(ModelFamily::of("llama3"), ModelFamily::Other);
        assert_eq!(ModelFamily::of("lmstudio"), ModelFamily::Other);
    }

    #[test]
    fn test_gpt4o_mini_cost() {
        let table = PricingTable::default();
        let PriceLookup::Priced(entry) = table.lookup("gpt-4o-mini") else {
            panic!("gpt-4o-mini should be priced");
        };
        let cost = entry.cost(1000, 500);
        assert!((cost - 0.00045).abs() < 1e-12);
    }

    #[test]
    fn test_gpt4_lookup_is_exact() {
        let table = PricingTable::default();
        match table.lookup("gpt-4") {
            PriceLookup::Priced(e) => assert_eq!(e.input_price_per_1k, 0.03),
            other => panic!("unexpected lookup: {other:?}"),
        }
        match table.lookup("gpt-4-32k") {
            PriceLookup::Priced(e) => assert_eq!(e.output_price_per_1k, 0.12),
            other => panic!("unexpected lookup: {other:?}"),
        }
    }

    #[test]
    fn test_unlisted_family_member() {
        let table = PricingTable::default();
        assert_eq!(table.lookup("gpt-4o"), PriceLookup::Unlisted(ModelFamily::Gpt4o));
        assert_eq!(
            table.lookup("gpt-3.5-turbo-9999"),
            PriceLookup::Unlisted(ModelFamily::Gpt35)
        );
    }

    #[test]
    fn test_image_and_unknown() {
        let table = PricingTable::default();
        assert_eq!(table.lookup("dall-e-3"), PriceLookup::ImageGeneration);
        assert_eq!(table.lookup("mistral"), PriceLookup::Unknown);
    }

    #[test]
    fn test_all_entries_unique_and_in_their_family() {
        let mut ids: Vec<_> = PRICING.iter().map(|e| e.model_id).collect();
        let len = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), len);

        for e in PRICING {
            assert_eq!(ModelFamily::of(e.model_id), e.model_family, "{}", e.model_id);
        }
    }

    #[test]
    fn test_custom_table() {
        static CUSTOM: &[PricingEntry] = &[entry(ModelFamily::Gpt4o, "gpt-4o", 0.0025, 0.01, 128_000)];
        let table = PricingTable::from_static(CUSTOM);
        assert!(matches!(table.lookup("gpt-4o"), PriceLookup::Priced(_)));
        assert_eq!(table.lookup("gpt-4o-mini"), PriceLookup::Unlisted(ModelFamily::Gpt4o));
    }
}
