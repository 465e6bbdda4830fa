// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI chat/completions usage extraction.
//!
//! Token counts live in the response `usage` object as `prompt_tokens` /
//! `completion_tokens`; cached prompt tokens, when present, are nested
//! under `prompt_tokens_details.cached_tokens` and are billed at a
//! discounted rate.

use http::HeaderMap;

use tollgate_core::{SpanType, UnitCounts, UsageRecord, UsageStatus};

use crate::registry::{host_of, UsageParser};
use crate::util::{parse_body, str_at, u64_at};

/// OpenAI REST API.
pub struct OpenAi;

impl UsageParser for OpenAi {
    fn provider_id(&self) -> &'static str {
        "openai"
    }

    fn matches(&self, url: &str) -> bool {
        host_of(url) == "api.openai.com"
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
                input: u64_at(&json, "/usage/prompt_tokens"),
                output: u64_at(&json, "/usage/completion_tokens"),
                cached_input: u64_at(&json, "/usage/prompt_tokens_details/cached_tokens"),
            },
            status: UsageStatus::Parsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_prompt_and_completion_tokens() {
        let body = serde_json::json!({
            "model": "gpt-4o-mini",
            "usage": {
                "prompt_tokens": 1000,
                "completion_tokens": 500,
                "total_tokens": 1500,
                "prompt_tokens_details": {"cached_tokens": 200, "audio_tokens": 0}
            }
        });
        let record = OpenAi.parse(body.to_string().as_bytes(), &HeaderMap::new());

        assert_eq!(record.model_or_endpoint.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(
            record.units,
            UnitCounts::Tokens {
                input: 1000,
                output: 500,
                cached_input: 200
            }
        );
    }

    #[test]
    fn schema_drift_is_tolerated() {
        // `usage` renamed or missing: zero units, still Parsed.
        let record = OpenAi.parse(br#"{"model": "gpt-5", "billing": {}}"#, &HeaderMap::new());
        assert!(record.units.is_zero());
        assert_eq!(record.status, UsageStatus::Parsed);
    }
}
