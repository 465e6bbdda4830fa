// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing rule types: dated, provider/model-scoped cost formulas.
//!
//! Rules are looked up by (provider, model, event timestamp) so that
//! historical events keep the price that was in effect when they
//! happened, even after prices change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The cost formula attached to a pricing rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PricingData {
    /// Separate per-token rates for input, output, and cached input.
    TokenBased {
        input_per_token: f64,
        output_per_token: f64,
        #[serde(default)]
        cached_input_per_token: f64,
    },
    /// Flat amount per call.
    PerCall { amount: f64 },
    /// Rate per second of billed duration.
    PerSecond { rate: f64 },
    /// Rate per minute of billed duration.
    PerMinute { rate: f64 },
    /// Rate per thousand units (characters, reads, ...).
    PerThousand { rate: f64 },
    /// Rate per million units.
    PerMillion { rate: f64 },
    /// Percentage of the transaction amount plus a fixed fee.
    TransactionBased { percent: f64, fixed_fee: f64 },
}

/// A dated, provider/model-scoped cost formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRule {
    /// Provider this rule applies to.
    pub provider: String,
    /// Model or endpoint; `None` makes this a provider-level default.
    pub model_or_endpoint: Option<String>,
    /// Cost formula.
    pub pricing: PricingData,
    /// Start of the effective range (inclusive).
    pub effective_from: DateTime<Utc>,
    /// End of the effective range (exclusive); `None` = open-ended.
    pub effective_until: Option<DateTime<Utc>>,
    /// Inactive rules are never resolved.
    pub active: bool,
}

impl PricingRule {
    /// Whether this rule is active and its date range covers `at`.
    pub fn in_effect_at(&self, at: DateTime<Utc>) -> bool {
        if !self.active || at < self.effective_from {
            return false;
        }
        match self.effective_until {
            Some(until) => at < until,
            None => true,
        }
    }
}
