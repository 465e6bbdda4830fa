// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider registry: ordered (predicate, parser) pairs.
//!
//! Detection evaluates registered predicates in stable registration
//! order; the first match wins. Adding a provider is registering a new
//! pair -- there is no central enumeration to extend.

use http::HeaderMap;
use tracing::debug;

use tollgate_core::{SpanType, UnitCounts, UsageRecord, UsageStatus};

/// Provider id used when no predicate matches.
pub const UNKNOWN_PROVIDER: &str = "unknown";

/// One registered provider: a URL predicate plus a usage parser.
pub trait UsageParser: Send + Sync {
    /// Stable provider identifier (e.g. "anthropic").
    fn provider_id(&self) -> &'static str;

    /// Whether this provider serves the given destination URL.
    fn matches(&self, url: &str) -> bool;

    /// Extract normalized usage from a response.
    ///
    /// Must be drift-tolerant: unknown fields are ignored, missing
    /// expected fields yield zero units, and malformed bodies yield a
    /// `ParseFailed` zero-unit record. Never an error.
    fn parse(&self, body: &[u8], headers: &HeaderMap) -> UsageRecord;

    /// Span type minted for calls this provider serves. LLM providers
    /// override this; everything else is a plain network call.
    fn call_span_type(&self) -> SpanType {
        SpanType::Http
    }
}

/// Extract the host portion of a URL without a full URL parser.
///
/// Good enough for predicate matching: strips the scheme, then cuts at
/// the first `/`, `?`, or `#`, then drops any `:port` or userinfo.
pub fn host_of(url: &str) -> &str {
    let rest = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(rest);
    let host = authority
        .rsplit_once('@')
        .map(|(_, host)| host)
        .unwrap_or(authority);
    host.split(':').next().unwrap_or(host)
}

/// Ordered registry of providers.
pub struct ProviderRegistry {
    parsers: Vec<Box<dyn UsageParser>>,
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Registry with all built-in providers, in stable order.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::anthropic::Anthropic));
        registry.register(Box::new(crate::openai::OpenAi));
        registry.register(Box::new(crate::elevenlabs::ElevenLabs));
        registry.register(Box::new(crate::twilio::Twilio));
        registry.register(Box::new(crate::stripe::Stripe));
        registry.register(Box::new(crate::pinecone::Pinecone));
        registry
    }

    /// Append a provider. Later registrations are checked after earlier
    /// ones.
    pub fn register(&mut self, parser: Box<dyn UsageParser>) {
        self.parsers.push(parser);
    }

    /// Detect the provider for a destination URL. First match wins.
    pub fn detect(&self, url: &str) -> Option<&dyn UsageParser> {
        self.parsers
            .iter()
            .find(|p| p.matches(url))
            .map(|p| p.as_ref())
    }

    /// Detect and return the provider id, or [`UNKNOWN_PROVIDER`].
    pub fn detect_id(&self, url: &str) -> &str {
        self.detect(url)
            .map(|p| p.provider_id())
            .unwrap_or(UNKNOWN_PROVIDER)
    }

    /// Span type for calls to the given destination. Unknown
    /// destinations are plain network calls.
    pub fn call_span_type(&self, url: &str) -> SpanType {
        self.detect(url)
            .map(|p| p.call_span_type())
            .unwrap_or(SpanType::Http)
    }

    /// Detect and parse in one step.
    ///
    /// Unknown destinations still yield a record (one counted call, no
    /// units to price) so call volume stays complete downstream.
    pub fn parse(&self, url: &str, body: &[u8], headers: &HeaderMap) -> UsageRecord {
        match self.detect(url) {
            Some(parser) => {
                let record = parser.parse(body, headers);
                debug!(
                    provider = record.provider,
                    status = %record.status,
                    "usage extracted"
                );
                record
            }
            None => UsageRecord {
                provider: UNKNOWN_PROVIDER.to_string(),
                model_or_endpoint: None,
                units: UnitCounts::Calls { count: 1 },
                status: UsageStatus::Parsed,
            },
        }
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// True when no providers are registered.
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
