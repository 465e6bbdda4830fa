// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stripe usage extraction.
//!
//! Charges and payment intents report `amount` in the currency's
//! smallest unit (cents for USD); the transaction amount is what
//! percentage-based pricing applies to. Tollgate consumes the amount
//! for costing only and never touches payment logic.

use http::HeaderMap;

use tollgate_core::{UnitCounts, UsageRecord, UsageStatus};

use crate::registry::{host_of, UsageParser};
use crate::util::{parse_body, str_at, u64_at};

/// Stripe payments API.
pub struct Stripe;

impl UsageParser for Stripe {
    fn provider_id(&self) -> &'static str {
        "stripe"
    }

    fn matches(&self, url: &str) -> bool {
        host_of(url) == "api.stripe.com"
    }

    fn parse(&self, body: &[u8], _headers: &HeaderMap) -> UsageRecord {
        let Some(json) = parse_body(body) else {
            return UsageRecord::parse_failed(self.provider_id());
        };

        let cents = u64_at(&json, "/amount");

        UsageRecord {
            provider: self.provider_id().to_string(),
            model_or_endpoint: str_at(&json, "/object").map(str::to_string),
            units: UnitCounts::TransactionAmount {
                amount: cents as f64 / 100.0,
            },
            status: UsageStatus::Parsed,
        }
    }
}
