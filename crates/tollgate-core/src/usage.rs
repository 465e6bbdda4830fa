// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalized usage extracted from provider responses prior to costing.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Typed unit counts, matching the pricing model the provider bills by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitCounts {
    /// Token counts from an LLM response.
    Tokens {
        input: u64,
        output: u64,
        /// Input tokens served from the provider's prompt cache.
        #[serde(default)]
        cached_input: u64,
    },
    /// Character counts (e.g. TTS synthesis input).
    Characters { count: u64 },
    /// Billed duration in seconds (e.g. telephony, transcription).
    Seconds { duration: f64 },
    /// Flat call counts (e.g. vector store operations).
    Calls { count: u64 },
    /// Monetary transaction amount in USD (e.g. payment processing).
    TransactionAmount { amount: f64 },
}

impl UnitCounts {
    /// Zero tokens; the default for a response we could not parse.
    pub fn zero_tokens() -> Self {
        UnitCounts::Tokens {
            input: 0,
            output: 0,
            cached_input: 0,
        }
    }

    /// True when every count in the record is zero.
    pub fn is_zero(&self) -> bool {
        match self {
            UnitCounts::Tokens {
                input,
                output,
                cached_input,
            } => *input == 0 && *output == 0 && *cached_input == 0,
            UnitCounts::Characters { count } => *count == 0,
            UnitCounts::Seconds { duration } => *duration == 0.0,
            UnitCounts::Calls { count } => *count == 0,
            UnitCounts::TransactionAmount { amount } => *amount == 0.0,
        }
    }
}

/// Outcome of usage extraction for one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UsageStatus {
    /// Usage fields were found and extracted.
    Parsed,
    /// The response did not match the provider schema; units are zero.
    ParseFailed,
}

/// Normalized usage for one network call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Detected provider id (e.g. "anthropic"), or "unknown".
    pub provider: String,
    /// Model or endpoint identifier when the response names one.
    pub model_or_endpoint: Option<String>,
    /// Typed unit counts.
    pub units: UnitCounts,
    /// Extraction outcome.
    pub status: UsageStatus,
}

impl UsageRecord {
    /// A zero-unit record for a response that could not be parsed.
    pub fn parse_failed(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model_or_endpoint: None,
            units: UnitCounts::zero_tokens(),
            status: UsageStatus::ParseFailed,
        }
    }
}
