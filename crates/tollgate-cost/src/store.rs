// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing rule resolution against a pricing store.
//!
//! The production store is an external collaborator; the trait here is
//! its read-only contract. Resolution is by specificity then recency:
//! an exact (provider, model) rule beats a provider-level default, and
//! among equally specific candidates the one with the latest
//! `effective_from` wins. Lookups carry the event timestamp so
//! historical events keep the price that was in effect at the time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tollgate_core::{PricingRule, TollgateError};

/// Read-only pricing rule lookup.
#[async_trait]
pub trait PricingStore: Send + Sync {
    /// Resolve the rule in effect for (provider, model) at `at`.
    ///
    /// `Ok(None)` means no rule matched -- the event is then flagged
    /// unpriced with cost 0, never a fabricated price.
    async fn lookup(
        &self,
        provider: &str,
        model_or_endpoint: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Option<PricingRule>, TollgateError>;
}

/// In-memory pricing store, used for tests and static deployments.
#[derive(Debug, Default)]
pub struct InMemoryPricingStore {
    rules: Vec<PricingRule>,
}

impl InMemoryPricingStore {
    /// Create a store from a set of rules.
    pub fn new(rules: Vec<PricingRule>) -> Self {
        Self { rules }
    }

    /// Add a rule.
    pub fn insert(&mut self, rule: PricingRule) {
        self.rules.push(rule);
    }

    fn best<'a>(
        &'a self,
        provider: &str,
        model: Option<&str>,
        at: DateTime<Utc>,
    ) -> Option<&'a PricingRule> {
        let candidates = || {
            self.rules
                .iter()
                .filter(|r| r.provider == provider && r.in_effect_at(at))
        };

        // Exact (provider, model/endpoint) first.
        if let Some(model) = model
            && let Some(rule) = candidates()
                .filter(|r| r.model_or_endpoint.as_deref() == Some(model))
                .max_by_key(|r| r.effective_from)
        {
            return Some(rule);
        }

        // Provider-level default.
        candidates()
            .filter(|r| r.model_or_endpoint.is_none())
            .max_by_key(|r| r.effective_from)
    }
}

#[async_trait]
impl PricingStore for InMemoryPricingStore {
    async fn lookup(
        &self,
        provider: &str,
        model_or_endpoint: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Option<PricingRule>, TollgateError> {
        Ok(self.best(provider, model_or_endpoint, at).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tollgate_core::PricingData;

    fn rule(
        provider: &str,
        model: Option<&str>,
        amount: f64,
        from: &str,
        until: Option<&str>,
    ) -> PricingRule {
        PricingRule {
            provider: provider.into(),
            model_or_endpoint: model.map(Into::into),
            pricing: PricingData::PerCall { amount },
            effective_from: from.parse().unwrap(),
            effective_until: until.map(|u| u.parse().unwrap()),
            active: true,
        }
    }

    fn amount(rule: &PricingRule) -> f64 {
        match rule.pricing {
            PricingData::PerCall { amount } => amount,
            _ => panic!("test rules are per-call"),
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn exact_model_beats_provider_default() {
        let store = InMemoryPricingStore::new(vec![
            rule("anthropic", None, 1.0, "2026-01-01T00:00:00Z", None),
            rule("anthropic", Some("claude-sonnet-4"), 2.0, "2026-01-01T00:00:00Z", None),
        ]);

        let resolved = store
            .lookup("anthropic", Some("claude-sonnet-4"), at(2026, 8, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(amount(&resolved), 2.0);
    }

    #[tokio::test]
    async fn falls_back_to_provider_default() {
        let store = InMemoryPricingStore::new(vec![rule(
            "anthropic",
            None,
            1.0,
            "2026-01-01T00:00:00Z",
            None,
        )]);

        let resolved = store
            .lookup("anthropic", Some("claude-nonexistent"), at(2026, 8, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(amount(&resolved), 1.0);
    }

    #[tokio::test]
    async fn no_match_is_none_never_a_guess() {
        let store = InMemoryPricingStore::new(vec![rule(
            "anthropic",
            None,
            1.0,
            "2026-01-01T00:00:00Z",
            None,
        )]);

        let resolved = store.lookup("openai", Some("gpt-4o"), at(2026, 8, 1)).await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn historical_timestamp_resolves_old_price() {
        // Price change on June 1st: events before keep the old rate.
        let store = InMemoryPricingStore::new(vec![
            rule(
                "openai",
                Some("gpt-4o"),
                1.0,
                "2026-01-01T00:00:00Z",
                Some("2026-06-01T00:00:00Z"),
            ),
            rule("openai", Some("gpt-4o"), 2.0, "2026-06-01T00:00:00Z", None),
        ]);

        let march = store
            .lookup("openai", Some("gpt-4o"), at(2026, 3, 15))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(amount(&march), 1.0);

        let july = store
            .lookup("openai", Some("gpt-4o"), at(2026, 7, 15))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(amount(&july), 2.0);
    }

    #[tokio::test]
    async fn overlapping_rules_latest_effective_from_wins() {
        let store = InMemoryPricingStore::new(vec![
            rule("stripe", None, 1.0, "2026-01-01T00:00:00Z", None),
            rule("stripe", None, 2.0, "2026-04-01T00:00:00Z", None),
        ]);

        let resolved = store.lookup("stripe", None, at(2026, 8, 1)).await.unwrap().unwrap();
        assert_eq!(amount(&resolved), 2.0);
    }

    #[tokio::test]
    async fn inactive_rules_are_skipped() {
        let mut inactive = rule("twilio", None, 9.0, "2026-01-01T00:00:00Z", None);
        inactive.active = false;
        let store = InMemoryPricingStore::new(vec![inactive]);

        assert!(store.lookup("twilio", None, at(2026, 8, 1)).await.unwrap().is_none());
    }
}
