// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pinecone usage extraction.
//!
//! Query responses report a `usage.readUnits` counter; upserts report
//! nothing, so they count as one call. Index hosts are per-project
//! subdomains, so detection matches the `.pinecone.io` suffix rather
//! than an exact host.

use http::HeaderMap;

use tollgate_core::{UnitCounts, UsageRecord, UsageStatus};

use crate::registry::{host_of, UsageParser};
use crate::util::{parse_body, u64_at};

/// Pinecone vector store API.
pub struct Pinecone;

impl UsageParser for Pinecone {
    fn provider_id(&self) -> &'static str {
        "pinecone"
    }

    fn matches(&self, url: &str) -> bool {
        let host = host_of(url);
        host == "pinecone.io" || host.ends_with(".pinecone.io")
    }

    fn parse(&self, body: &[u8], _headers: &HeaderMap) -> UsageRecord {
        let Some(json) = parse_body(body) else {
            return UsageRecord::parse_failed(self.provider_id());
        };

        let read_units = u64_at(&json, "/usage/readUnits");
        let count = if read_units > 0 { read_units } else { 1 };

        UsageRecord {
            provider: self.provider_id().to_string(),
            model_or_endpoint: None,
            units: UnitCounts::Calls { count },
            status: UsageStatus::Parsed,
        }
    }
}
