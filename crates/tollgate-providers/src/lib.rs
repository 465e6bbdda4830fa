// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider detection and response parsing for Tollgate.
//!
//! Classifies a call's destination and extracts normalized usage from
//! provider-specific responses. Parsers are registered as (predicate,
//! parser) pairs in a stable-ordered registry; parsing is always
//! drift-tolerant and never surfaces an error to the caller.

pub mod anthropic;
pub mod elevenlabs;
pub mod openai;
pub mod pinecone;
pub mod registry;
pub mod stripe;
pub mod twilio;
mod util;

pub use registry::{host_of, ProviderRegistry, UsageParser, UNKNOWN_PROVIDER};
