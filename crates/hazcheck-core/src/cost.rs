//! Usage/cost estimation
//!
//! Display-only dollar estimate derived from token counts. Never gates or
//! retries a request.

use serde::{Deserialize, Serialize};

/// Per-token dollar rates for a model family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelRates {
    pub input_per_token: f64,
    pub output_per_token: f64,
}

// Published per-million rates, normalized to per-token.
const PRO_RATES: ModelRates = ModelRates {
    input_per_token: 1.25 / 1_000_000.0,
    output_per_token: 10.0 / 1_000_000.0,
};

const FLASH_RATES: ModelRates = ModelRates {
    input_per_token: 0.30 / 1_000_000.0,
    output_per_token: 2.50 / 1_000_000.0,
};

/// Rate lookup by substring match on the model id; anything that is not a
/// "pro" tier bills at the default fast tier.
pub fn rates_for(model_id: &str) -> ModelRates {
    if model_id.to_ascii_lowercase().contains("pro") {
        PRO_RATES
    } else {
        FLASH_RATES
    }
}

/// Token usage plus the derived cost estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageInfo {
    pub model_id: String,
    pub prompt_tokens: u64,
    pub candidate_tokens: u64,
    pub total_tokens: u64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub estimated_cost: f64,
}

/// Convert token counts into a display-only cost estimate.
pub fn cost_of(model_id: &str, prompt_tokens: u64, candidate_tokens: u64) -> UsageInfo {
    let rates = rates_for(model_id);
    let input_cost = prompt_tokens as f64 * rates.input_per_token;
    let output_cost = candidate_tokens as f64 * rates.output_per_token;

    UsageInfo {
        model_id: model_id.to_string(),
        prompt_tokens,
        candidate_tokens,
        total_tokens: prompt_tokens + candidate_tokens,
        input_cost,
        output_cost,
        estimated_cost: input_cost + output_cost,
    }
}
