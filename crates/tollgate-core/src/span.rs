// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Span types: the time-bounded record of one tracked unit of work.
//!
//! A span is created when a wrapped callable is entered (or when a raw
//! network call needs attribution and no wrapper is open) and closed
//! exactly once on success, error, or cancellation. Parent/child links
//! are established at creation time and never rewritten afterwards, so
//! downstream tree reconstruction relies on ids rather than emission
//! order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::ids::{CustomerId, RunId, SpanId, TraceId};

/// The kind of work a span represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpanType {
    /// An agent entrypoint wrapper.
    Agent,
    /// A tool invocation wrapper.
    Tool,
    /// An LLM call wrapper.
    Llm,
    /// A user-labelled section of code.
    Section,
    /// A non-LLM network call observed at the proxy.
    Http,
    /// Synthetic root minted for an unattributed network call.
    HttpFallback,
}

/// Three-tier ordering used to decide which open span owns an observed
/// network call. Higher wins; within a tier the innermost span wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PriorityClass {
    /// Fallback spans minted for otherwise-unattributed calls.
    Fallback = 0,
    /// Plain labelled sections.
    Section = 1,
    /// Explicit agent/tool/llm wrappers.
    Wrapper = 2,
}

impl SpanType {
    /// The attribution priority class of this span type.
    pub fn priority_class(&self) -> PriorityClass {
        match self {
            SpanType::Agent | SpanType::Tool | SpanType::Llm => PriorityClass::Wrapper,
            SpanType::Section => PriorityClass::Section,
            SpanType::Http | SpanType::HttpFallback => PriorityClass::Fallback,
        }
    }
}

/// Terminal state of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpanStatus {
    /// Still running.
    Open,
    /// Completed normally.
    Ok,
    /// Completed with an error (captured in `error`, re-raised to the app).
    Error,
    /// The owning task was dropped before completion.
    Cancelled,
}

/// Error details captured from a failed callable.
///
/// The original error is always re-propagated unchanged to the
/// application; this is a telemetry copy only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanError {
    /// Error type name or variant, best-effort.
    pub kind: String,
    /// Rendered error message.
    pub message: String,
}

/// Time-bounded record of one tracked unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    /// Unique span identifier.
    pub span_id: SpanId,
    /// The enclosing span open in the same execution unit at creation
    /// time, if any.
    pub parent_span_id: Option<SpanId>,
    /// Trace this span belongs to.
    pub trace_id: TraceId,
    /// Application-level run this span belongs to.
    pub run_id: RunId,
    /// Customer the work is billed against, when known.
    pub customer_id: Option<CustomerId>,
    /// Human-readable label (agent name, tool name, section label).
    pub label: String,
    /// Kind of work.
    pub span_type: SpanType,
    /// When the span opened.
    pub start_time: DateTime<Utc>,
    /// When the span closed; `None` while open.
    pub end_time: Option<DateTime<Utc>>,
    /// Current status.
    pub status: SpanStatus,
    /// Captured error, present only when `status == Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SpanError>,
}

impl Span {
    /// Open a new root span, minting a fresh trace id.
    pub fn root(label: impl Into<String>, span_type: SpanType, run_id: RunId) -> Self {
        Self {
            span_id: SpanId::new(),
            parent_span_id: None,
            trace_id: TraceId::new(),
            run_id,
            customer_id: None,
            label: label.into(),
            span_type,
            start_time: Utc::now(),
            end_time: None,
            status: SpanStatus::Open,
            error: None,
        }
    }

    /// Open a child of this span, inheriting trace, run, and customer.
    pub fn child(&self, label: impl Into<String>, span_type: SpanType) -> Self {
        Self {
            span_id: SpanId::new(),
            parent_span_id: Some(self.span_id.clone()),
            trace_id: self.trace_id.clone(),
            run_id: self.run_id.clone(),
            customer_id: self.customer_id.clone(),
            label: label.into(),
            span_type,
            start_time: Utc::now(),
            end_time: None,
            status: SpanStatus::Open,
            error: None,
        }
    }

    /// Close the span with the given terminal status.
    ///
    /// Closing an already-closed span is a no-op: the first close wins.
    pub fn close(&mut self, status: SpanStatus) {
        if self.end_time.is_some() {
            return;
        }
        self.end_time = Some(Utc::now());
        self.status = status;
    }

    /// Close the span as failed, capturing error details for telemetry.
    pub fn close_with_error(&mut self, kind: impl Into<String>, message: impl Into<String>) {
        if self.end_time.is_some() {
            return;
        }
        self.error = Some(SpanError {
            kind: kind.into(),
            message: message.into(),
        });
        self.close(SpanStatus::Error);
    }

    /// Whether the span is still open.
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_class_ordering() {
        assert!(SpanType::Agent.priority_class() > SpanType::Section.priority_class());
        assert!(SpanType::Section.priority_class() > SpanType::HttpFallback.priority_class());
        assert_eq!(
            SpanType::Tool.priority_class(),
            SpanType::Llm.priority_class()
        );
    }

    #[test]
    fn child_inherits_trace_and_links_parent() {
        let mut root = Span::root("agent-a", SpanType::Agent, RunId::from("run-1"));
        root.customer_id = Some(CustomerId::from("cust-9"));
        let child = root.child("tool-t", SpanType::Tool);

        assert_eq!(child.parent_span_id, Some(root.span_id.clone()));
        assert_eq!(child.trace_id, root.trace_id);
        assert_eq!(child.run_id, root.run_id);
        assert_eq!(child.customer_id, root.customer_id);
        assert!(child.is_open());
    }

    #[test]
    fn close_is_idempotent_first_close_wins() {
        let mut span = Span::root("s", SpanType::Section, RunId::new());
        span.close(SpanStatus::Ok);
        let first_end = span.end_time;
        span.close(SpanStatus::Error);
        assert_eq!(span.status, SpanStatus::Ok);
        assert_eq!(span.end_time, first_end);
    }

    #[test]
    fn close_with_error_captures_details() {
        let mut span = Span::root("t", SpanType::Tool, RunId::new());
        span.close_with_error("io", "connection reset");
        assert_eq!(span.status, SpanStatus::Error);
        let err = span.error.as_ref().unwrap();
        assert_eq!(err.kind, "io");
        assert_eq!(err.message, "connection reset");
    }

    #[test]
    fn span_type_string_roundtrip() {
        use std::str::FromStr;
        assert_eq!(SpanType::HttpFallback.to_string(), "http_fallback");
        assert_eq!(SpanType::Http.to_string(), "http");
        assert_eq!(
            SpanType::from_str("http_fallback").unwrap(),
            SpanType::HttpFallback
        );
        assert_eq!(SpanType::from_str("http").unwrap(), SpanType::Http);
    }
}
