// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guaranteed-release span guards and the `traced` callable wrappers.
//!
//! A span opens before any user code in the wrapped future runs and
//! closes on every exit path: normal return (Ok), error return (Error,
//! with the error captured into span metadata and re-propagated
//! unchanged), or the future being dropped mid-flight (Cancelled, via
//! the guard's `Drop`). Instrumentation never alters the application's
//! control flow or its error values.

use tracing::debug;

use tollgate_context::with_current;
use tollgate_core::{SpanId, SpanStatus, SpanType};

/// Scoped handle to an open span on the current unit's stack.
///
/// Completing the guard closes the span with the given outcome; dropping
/// it without completing closes the span as cancelled. Either way the
/// span is popped exactly once.
#[derive(Debug)]
pub struct SpanGuard {
    span_id: SpanId,
    done: bool,
}

impl SpanGuard {
    /// Open a span on the current unit's stack.
    ///
    /// Returns `None` when no context is installed for this unit, which
    /// callers treat as "tracing disabled": user code runs unwrapped.
    pub fn open(label: &str, span_type: SpanType) -> Option<Self> {
        let span_id = with_current(|stack| stack.open(label, span_type))?;
        Some(Self {
            span_id,
            done: false,
        })
    }

    /// The id of the guarded span.
    pub fn span_id(&self) -> &SpanId {
        &self.span_id
    }

    /// Close the span as successful.
    pub fn complete_ok(mut self) {
        self.finish(SpanStatus::Ok, None);
    }

    /// Close the span as failed, capturing the error for telemetry.
    pub fn complete_err(mut self, kind: &str, message: &str) {
        self.finish(SpanStatus::Error, Some((kind.to_string(), message.to_string())));
    }

    fn finish(&mut self, status: SpanStatus, error: Option<(String, String)>) {
        if self.done {
            return;
        }
        self.done = true;
        with_current(|stack| {
            if let Some(mut span) = stack.pop_span(&self.span_id) {
                match &error {
                    Some((kind, message)) => span.close_with_error(kind, message),
                    None => span.close(status),
                }
                debug!(
                    span_id = %span.span_id,
                    label = %span.label,
                    span_type = %span.span_type,
                    status = %span.status,
                    "span closed"
                );
            }
        });
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        // Reaching Drop without completion means the owning future was
        // dropped mid-flight.
        self.finish(SpanStatus::Cancelled, None);
    }
}

/// Run a future inside a span of the given type.
///
/// The error value is returned to the caller unchanged; only a rendered
/// copy goes into the span.
pub async fn traced<F, T, E>(label: &str, span_type: SpanType, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let Some(guard) = SpanGuard::open(label, span_type) else {
        return fut.await;
    };
    match fut.await {
        Ok(value) => {
            guard.complete_ok();
            Ok(value)
        }
        Err(err) => {
            guard.complete_err(std::any::type_name::<E>(), &err.to_string());
            Err(err)
        }
    }
}

/// Run a future inside an agent span.
pub async fn traced_agent<F, T, E>(label: &str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    traced(label, SpanType::Agent, fut).await
}

/// Run a future inside a tool span.
pub async fn traced_tool<F, T, E>(label: &str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    traced(label, SpanType::Tool, fut).await
}

/// Run a future inside an LLM-call span.
pub async fn traced_llm<F, T, E>(label: &str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    traced(label, SpanType::Llm, fut).await
}

/// Run a future inside a plain labelled section span.
pub async fn traced_section<F, T, E>(label: &str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    traced(label, SpanType::Section, fut).await
}
