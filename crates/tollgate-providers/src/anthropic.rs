// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API usage extraction.
//!
//! Token counts live in the response `usage` object: `input_tokens`,
//! `output_tokens`, plus `cache_read_input_tokens` and
//! `cache_creation_input_tokens` when prompt caching is in play. Cache
//! reads are billed at their own rate, so they are kept separate from
//! plain input.

use http::HeaderMap;

use tollgate_core::{SpanType, UnitCounts, UsageRecord, UsageStatus};

use crate::registry::{host_of, UsageParser};
use crate::util::{parse_body, str_at, u64_at};

/// Anthropic Messages API.
pub struct Anthropic;

impl UsageParser for Anthropic {
    fn provider_id(&self) -> &'static str {
        "anthropic"
    }

    fn matches(&self, url: &str) -> bool {
        host_of(url) == "api.anthropic.com"
    }

    fn call_span_type(&self) -> SpanType {
        SpanType::Llm
    }

    fn parse(&self, body: &[u8], _headers: &HeaderMap) -> UsageRecord {
        let Some(json) = parse_body(body) else {
            return UsageRecord::parse_failed(self.provider_id());
        };

        UsageRecord {
            provider: self.provider_id().to_string(),
            model_or_endpoint: str_at(&json, "/model").map(str::to_string),
            units: UnitCounts::Tokens {
                input: u64_at(&json, "/usage/input_tokens"),
                output: u64_at(&json, "/usage/output_tokens"),
                cached_input: u64_at(&json, "/usage/cache_read_input_tokens"),
            },
            status: UsageStatus::Parsed,
        }
    }
}
