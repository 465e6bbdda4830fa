// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ElevenLabs TTS usage extraction.
//!
//! Synthesis responses are audio bytes; the billed character count comes
//! back in the `character-cost` response header. History endpoints
//! return JSON with a `character_count_change_to` style body instead, so
//! the header is preferred and the body is a fallback.

use http::HeaderMap;

use tollgate_core::{UnitCounts, UsageRecord, UsageStatus};

use crate::registry::{host_of, UsageParser};
use crate::util::{parse_body, u64_at};

/// ElevenLabs voice API.
pub struct ElevenLabs;

impl UsageParser for ElevenLabs {
    fn provider_id(&self) -> &'static str {
        "elevenlabs"
    }

    fn matches(&self, url: &str) -> bool {
        host_of(url) == "api.elevenlabs.io"
    }

    fn parse(&self, body: &[u8], headers: &HeaderMap) -> UsageRecord {
        let header_count = headers
            .get("character-cost")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let count = match header_count {
            Some(count) => count,
            // Audio bodies fail JSON parsing; that is expected here and
            // simply reads as zero characters.
            None => parse_body(body)
                .map(|json| u64_at(&json, "/character_count"))
                .unwrap_or(0),
        };

        UsageRecord {
            provider: self.provider_id().to_string(),
            model_or_endpoint: None,
            units: UnitCounts::Characters { count },
            status: UsageStatus::Parsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_count_preferred_over_body() {
        let mut headers = HeaderMap::new();
        headers.insert("character-cost", "834".parse().unwrap());
        let record = ElevenLabs.parse(b"\xffbinary-audio", &headers);
        assert_eq!(record.units, UnitCounts::Characters { count: 834 });
    }

    #[test]
    fn body_fallback_when_no_header() {
        let record = ElevenLabs.parse(br#"{"character_count": 120}"#, &HeaderMap::new());
        assert_eq!(record.units, UnitCounts::Characters { count: 120 });
    }

    #[test]
    fn audio_body_without_header_is_zero_characters() {
        let record = ElevenLabs.parse(b"\xff\xfb\x90audio", &HeaderMap::new());
        assert_eq!(record.units, UnitCounts::Characters { count: 0 });
        assert_eq!(record.status, UsageStatus::Parsed);
    }
}
