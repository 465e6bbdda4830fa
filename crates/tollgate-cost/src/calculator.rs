// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost calculation: usage plus a pricing rule yields a USD amount.
//!
//! Every pricing type has an exact formula; a usage record whose unit
//! kind does not fit the rule's formula prices to zero with a warning
//! rather than guessing.

use tracing::warn;

use tollgate_core::{PricingData, UnitCounts};

/// Total unit volume for the tiered volume formulas.
fn volume(units: &UnitCounts) -> f64 {
    match units {
        UnitCounts::Tokens {
            input,
            output,
            cached_input,
        } => (input + output + cached_input) as f64,
        UnitCounts::Characters { count } => *count as f64,
        UnitCounts::Calls { count } => *count as f64,
        UnitCounts::Seconds { duration } => *duration,
        UnitCounts::TransactionAmount { amount } => *amount,
    }
}

/// Compute the cost in USD of the given usage under the given formula.
pub fn compute(units: &UnitCounts, pricing: &PricingData) -> f64 {
    match (pricing, units) {
        (
            PricingData::TokenBased {
                input_per_token,
                output_per_token,
                cached_input_per_token,
            },
            UnitCounts::Tokens {
                input,
                output,
                cached_input,
            },
        ) => {
            *input as f64 * input_per_token
                + *output as f64 * output_per_token
                + *cached_input as f64 * cached_input_per_token
        }
        (PricingData::PerCall { amount }, UnitCounts::Calls { count }) => amount * *count as f64,
        // A per-call rule on a non-call record still bills the one call
        // the record represents.
        (PricingData::PerCall { amount }, _) => *amount,
        (PricingData::PerSecond { rate }, UnitCounts::Seconds { duration }) => rate * duration,
        (PricingData::PerMinute { rate }, UnitCounts::Seconds { duration }) => {
            rate * duration / 60.0
        }
        (PricingData::PerThousand { rate }, units) => rate * volume(units) / 1_000.0,
        (PricingData::PerMillion { rate }, units) => rate * volume(units) / 1_000_000.0,
        (
            PricingData::TransactionBased { percent, fixed_fee },
            UnitCounts::TransactionAmount { amount },
        ) => amount * percent / 100.0 + fixed_fee,
        (pricing, units) => {
            warn!(?pricing, ?units, "pricing formula does not fit unit kind; cost is 0");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "expected {b}, got {a}");
    }

    #[test]
    fn token_based_reference_case() {
        // 1000 x 0.000003 + 500 x 0.000015 = 0.0105
        let cost = compute(
            &UnitCounts::Tokens {
                input: 1000,
                output: 500,
                cached_input: 0,
            },
            &PricingData::TokenBased {
                input_per_token: 0.000003,
                output_per_token: 0.000015,
                cached_input_per_token: 0.0,
            },
        );
        close(cost, 0.0105);
    }

    #[test]
    fn token_based_counts_cached_input_separately() {
        let cost = compute(
            &UnitCounts::Tokens {
                input: 1000,
                output: 0,
                cached_input: 1000,
            },
            &PricingData::TokenBased {
                input_per_token: 0.000003,
                output_per_token: 0.000015,
                cached_input_per_token: 0.0000003,
            },
        );
        close(cost, 0.003 + 0.0003);
    }

    #[test]
    fn per_call_multiplies_count() {
        let cost = compute(
            &UnitCounts::Calls { count: 6 },
            &PricingData::PerCall { amount: 0.004 },
        );
        close(cost, 0.024);
    }

    #[test]
    fn duration_formulas() {
        let minute_rate = PricingData::PerMinute { rate: 0.014 };
        close(
            compute(&UnitCounts::Seconds { duration: 90.0 }, &minute_rate),
            0.021,
        );

        let second_rate = PricingData::PerSecond { rate: 0.0004 };
        close(
            compute(&UnitCounts::Seconds { duration: 90.0 }, &second_rate),
            0.036,
        );
    }

    #[test]
    fn volume_formulas() {
        close(
            compute(
                &UnitCounts::Characters { count: 5000 },
                &PricingData::PerThousand { rate: 0.30 },
            ),
            1.5,
        );
        close(
            compute(
                &UnitCounts::Characters { count: 500_000 },
                &PricingData::PerMillion { rate: 100.0 },
            ),
            50.0,
        );
    }

    #[test]
    fn transaction_based_percent_plus_fee() {
        let cost = compute(
            &UnitCounts::TransactionAmount { amount: 100.0 },
            &PricingData::TransactionBased {
                percent: 2.9,
                fixed_fee: 0.30,
            },
        );
        close(cost, 3.20);
    }

    #[test]
    fn mismatched_formula_prices_to_zero() {
        let cost = compute(
            &UnitCounts::Seconds { duration: 10.0 },
            &PricingData::TokenBased {
                input_per_token: 1.0,
                output_per_token: 1.0,
                cached_input_per_token: 0.0,
            },
        );
        close(cost, 0.0);
    }

    #[test]
    fn zero_units_zero_cost() {
        let cost = compute(
            &UnitCounts::zero_tokens(),
            &PricingData::TokenBased {
                input_per_token: 0.000003,
                output_per_token: 0.000015,
                cached_input_per_token: 0.0,
            },
        );
        close(cost, 0.0);
    }
}
