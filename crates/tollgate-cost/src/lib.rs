// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost calculation for Tollgate.
//!
//! Converts normalized usage plus a resolved pricing rule into a USD
//! amount. Rules come from a pricing store collaborator, keyed by
//! (provider, model, event timestamp).

pub mod calculator;
pub mod store;

pub use calculator::compute;
pub use store::{InMemoryPricingStore, PricingStore};

use chrono::{DateTime, Utc};
use tracing::debug;

use tollgate_core::{TollgateError, UsageRecord};

/// Outcome of pricing one usage record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Priced {
    /// Cost in USD; exactly 0.0 when unpriced.
    pub cost_usd: f64,
    /// True when no pricing rule matched.
    pub unpriced: bool,
}

/// Resolve a rule for `usage` at `at` and compute the cost.
///
/// A store backend failure is an error; a rule miss is not -- it prices
/// to zero and flags the result unpriced.
pub async fn price(
    store: &dyn PricingStore,
    usage: &UsageRecord,
    at: DateTime<Utc>,
) -> Result<Priced, TollgateError> {
    let rule = store
        .lookup(&usage.provider, usage.model_or_endpoint.as_deref(), at)
        .await?;

    match rule {
        Some(rule) => {
            let cost_usd = compute(&usage.units, &rule.pricing);
            debug!(
                provider = usage.provider,
                model = ?usage.model_or_endpoint,
                cost_usd,
                "usage priced"
            );
            Ok(Priced {
                cost_usd,
                unpriced: false,
            })
        }
        None => {
            debug!(
                provider = usage.provider,
                model = ?usage.model_or_endpoint,
                "no pricing rule matched; event is unpriced"
            );
            Ok(Priced {
                cost_usd: 0.0,
                unpriced: true,
            })
        }
    }
}
