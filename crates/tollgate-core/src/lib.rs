// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tollgate cost-tracing pipeline.
//!
//! This crate provides the shared data model (spans, usage records,
//! pricing rules, events), identifiers, and the error type used across
//! the Tollgate workspace.

pub mod error;
pub mod event;
pub mod ids;
pub mod pricing;
pub mod span;
pub mod usage;

// Re-export key items at crate root for ergonomic imports.
pub use error::TollgateError;
pub use event::Event;
pub use ids::{CustomerId, RunId, SpanId, TraceId};
pub use pricing::{PricingData, PricingRule};
pub use span::{PriorityClass, Span, SpanError, SpanStatus, SpanType};
pub use usage::{UnitCounts, UsageRecord, UsageStatus};

/// Transport metadata header names. This is a bit-exact wire contract
/// shared by the interception layer and the proxy; changing a name
/// breaks attribution for mixed-version deployments.
pub mod headers {
    /// Trace identifier of the current execution.
    pub const TRACE_ID: &str = "x-tollgate-trace-id";
    /// Span the request should be attributed to.
    pub const SPAN_ID: &str = "x-tollgate-span-id";
    /// Application-level run identifier.
    pub const RUN_ID: &str = "x-tollgate-run-id";
    /// Customer identifier, when known.
    pub const CUSTOMER_ID: &str = "x-tollgate-customer-id";
    /// Real destination URL, consumed and stripped by the proxy.
    pub const TARGET: &str = "x-tollgate-target";

    /// All internal routing/metadata headers, for stripping.
    pub const ALL: &[&str] = &[TRACE_ID, SPAN_ID, RUN_ID, CUSTOMER_ID, TARGET];
}
