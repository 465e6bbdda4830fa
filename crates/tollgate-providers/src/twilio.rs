// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio usage extraction.
//!
//! Call resources carry a `duration` field (whole seconds, stringified
//! by the API). Responses without a duration (message sends, lookups)
//! are billed per call.

use http::HeaderMap;

use tollgate_core::{UnitCounts, UsageRecord, UsageStatus};

use crate::registry::{host_of, UsageParser};
use crate::util::{f64_at, parse_body, str_at};

/// Twilio communications API.
pub struct Twilio;

impl UsageParser for Twilio {
    fn provider_id(&self) -> &'static str {
        "twilio"
    }

    fn matches(&self, url: &str) -> bool {
        host_of(url) == "api.twilio.com"
    }

    fn parse(&self, body: &[u8], _headers: &HeaderMap) -> UsageRecord {
        let Some(json) = parse_body(body) else {
            return UsageRecord::parse_failed(self.provider_id());
        };

        let units = if json.pointer("/duration").is_some() {
            UnitCounts::Seconds {
                duration: f64_at(&json, "/duration"),
            }
        } else {
            UnitCounts::Calls { count: 1 }
        };

        UsageRecord {
            provider: self.provider_id().to_string(),
            model_or_endpoint: str_at(&json, "/uri")
                .map(|uri| uri.trim_start_matches('/').to_string()),
            units,
            status: UsageStatus::Parsed,
        }
    }
}
