//! Cost calculation for answer generation.
//!
//! Prices are USD per million tokens.

/// Pricing tier per million tokens.
struct PricingTier {
    input_per_million: f64,
    output_per_million: f64,
}

const GPT_4O: PricingTier = PricingTier {
    input_per_million: 2.50,
    output_per_million: 10.00,
};

const GPT_4O_MINI: PricingTier = PricingTier {
    input_per_million: 0.15,
    output_per_million: 0.60,
};

const GPT_4_1: PricingTier = PricingTier {
    input_per_million: 2.00,
    output_per_million: 8.00,
};

const GPT_4_1_MINI: PricingTier = PricingTier {
    input_per_million: 0.40,
    output_per_million: 1.60,
};

const GPT_4_1_NANO: PricingTier = PricingTier {
    input_per_million: 0.10,
    output_per_million: 0.40,
};

const GPT_3_5_TURBO: PricingTier = PricingTier {
    input_per_million: 0.50,
    output_per_million: 1.50,
};

/// Model families by prefix, most specific first.
const TIERS: &[(&str, &PricingTier)] = &[
    ("gpt-4o-mini", &GPT_4O_MINI),
    ("gpt-4o", &GPT_4O),
    ("gpt-4.1-nano", &GPT_4_1_NANO),
    ("gpt-4.1-mini", &GPT_4_1_MINI),
    ("gpt-4.1", &GPT_4_1),
    ("gpt-3.5-turbo", &GPT_3_5_TURBO),
];

fn get_pricing_tier(model: &str) -> Option<&'static PricingTier> {
    let lower = model.to_lowercase();
    TIERS
        .iter()
        .find(|(prefix, _)| lower.starts_with(prefix))
        .map(|(_, tier)| *tier)
}

/// Calculate cost for a single request.
///
/// Returns the total cost in USD, or `None` when pricing is unavailable.
pub fn calculate_cost(model: &str, prompt_tokens: u32, completion_tokens: u32) -> Option<f64> {
    let pricing = get_pricing_tier(model)?;
    let input_cost = (f64::from(prompt_tokens) / 1_000_000.0) * pricing.input_per_million;
    let output_cost = (f64::from(completion_tokens) / 1_000_000.0) * pricing.output_per_million;
    Some(input_cost + output_cost)
}
