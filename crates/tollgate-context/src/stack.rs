// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-execution-unit span stack.
//!
//! A `SpanStack` is owned by exactly one logical execution unit (thread,
//! task, or restored snapshot) and is never shared, so it needs no
//! locking. Crossing a unit boundary is always by explicit
//! `export()` / `from_snapshot()` copy, never shared mutable state.

use serde::{Deserialize, Serialize};
use tracing::warn;

use tollgate_core::{CustomerId, RunId, Span, SpanId, SpanType, TraceId};

/// Serializable capture of the current attribution position, used to
/// hand context across thread, task, or process boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    /// Trace the receiving unit should continue.
    pub trace_id: TraceId,
    /// Innermost open span at export time; new spans in the receiving
    /// unit chain from this. `None` when nothing was open.
    pub span_id: Option<SpanId>,
    /// Run identifier, carried through unchanged.
    pub run_id: RunId,
    /// Customer identifier, carried through unchanged.
    pub customer_id: Option<CustomerId>,
}

/// Ordered stack of the currently open spans for one execution unit.
#[derive(Debug)]
pub struct SpanStack {
    trace_id: TraceId,
    run_id: RunId,
    customer_id: Option<CustomerId>,
    /// Parent inherited from an imported snapshot; applies to the first
    /// span opened on this stack.
    seed_parent: Option<SpanId>,
    spans: Vec<Span>,
}

impl SpanStack {
    /// Create a fresh, empty stack with a newly minted trace id.
    pub fn new(run_id: RunId, customer_id: Option<CustomerId>) -> Self {
        Self {
            trace_id: TraceId::new(),
            run_id,
            customer_id,
            seed_parent: None,
            spans: Vec::new(),
        }
    }

    /// Seed a fresh stack from an exported snapshot so that new spans
    /// chain from the snapshot's span.
    pub fn from_snapshot(snapshot: ContextSnapshot) -> Self {
        Self {
            trace_id: snapshot.trace_id,
            run_id: snapshot.run_id,
            customer_id: snapshot.customer_id,
            seed_parent: snapshot.span_id,
            spans: Vec::new(),
        }
    }

    /// Open a new span as a child of the innermost open span (or of the
    /// imported seed when the stack is empty) and push it.
    pub fn open(&mut self, label: impl Into<String>, span_type: SpanType) -> SpanId {
        let span = match self.spans.last() {
            Some(top) => top.child(label, span_type),
            None => {
                let mut span = Span::root(label, span_type, self.run_id.clone());
                span.trace_id = self.trace_id.clone();
                span.parent_span_id = self.seed_parent.clone();
                span.customer_id = self.customer_id.clone();
                span
            }
        };
        let id = span.span_id.clone();
        self.push(span);
        id
    }

    /// Push an externally constructed span.
    pub fn push(&mut self, span: Span) {
        self.spans.push(span);
    }

    /// Pop the innermost span. Defensive no-op (returns `None`) when the
    /// stack is already empty.
    pub fn pop(&mut self) -> Option<Span> {
        self.spans.pop()
    }

    /// Pop the span with the given id.
    ///
    /// Normally that span is the top of the stack. If inner spans were
    /// leaked (a guard dropped out of order), everything above it is
    /// discarded with a warning so the stack stays consistent.
    pub fn pop_span(&mut self, span_id: &SpanId) -> Option<Span> {
        let pos = self.spans.iter().rposition(|s| &s.span_id == span_id)?;
        if pos + 1 != self.spans.len() {
            warn!(
                span_id = %span_id,
                leaked = self.spans.len() - pos - 1,
                "closing span with unclosed children; discarding leaked spans"
            );
            self.spans.truncate(pos + 1);
        }
        self.spans.pop()
    }

    /// The innermost open span, if any.
    pub fn current(&self) -> Option<&Span> {
        self.spans.last()
    }

    /// Iterate the open spans, outermost first.
    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.spans.iter()
    }

    /// Number of open spans.
    pub fn depth(&self) -> usize {
        self.spans.len()
    }

    /// True when no spans are open.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The run id this stack was created for.
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// The customer id this stack was created for, if any.
    pub fn customer_id(&self) -> Option<&CustomerId> {
        self.customer_id.as_ref()
    }

    /// The trace id spans on this stack belong to.
    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// Capture the current position for hand-off to another unit.
    ///
    /// When nothing is open, the snapshot carries the imported seed (if
    /// any) so chained hand-offs stay anchored to the original parent.
    pub fn export(&self) -> ContextSnapshot {
        ContextSnapshot {
            trace_id: self.trace_id.clone(),
            span_id: self
                .spans
                .last()
                .map(|s| s.span_id.clone())
                .or_else(|| self.seed_parent.clone()),
            run_id: self.run_id.clone(),
            customer_id: self.customer_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> SpanStack {
        SpanStack::new(RunId::from("run-1"), Some(CustomerId::from("cust-1")))
    }

    #[test]
    fn open_chains_from_innermost() {
        let mut s = stack();
        let agent = s.open("agent-a", SpanType::Agent);
        let tool = s.open("tool-t", SpanType::Tool);

        let top = s.current().unwrap();
        assert_eq!(top.span_id, tool);
        assert_eq!(top.parent_span_id, Some(agent.clone()));
        assert_eq!(s.depth(), 2);

        s.pop();
        assert_eq!(s.current().unwrap().span_id, agent);
    }

    #[test]
    fn pop_on_empty_is_noop() {
        let mut s = stack();
        assert!(s.pop().is_none());
        assert!(s.is_empty());
    }

    #[test]
    fn export_import_roundtrip_chains_new_spans() {
        let mut s = stack();
        let agent = s.open("agent-a", SpanType::Agent);
        let snapshot = s.export();

        let mut restored = SpanStack::from_snapshot(snapshot.clone());
        let child = restored.open("tool-remote", SpanType::Tool);

        let span = restored.current().unwrap();
        assert_eq!(span.span_id, child);
        assert_eq!(span.parent_span_id, Some(agent));
        assert_eq!(span.trace_id, snapshot.trace_id);
        assert_eq!(span.run_id, RunId::from("run-1"));
        assert_eq!(span.customer_id, Some(CustomerId::from("cust-1")));
    }

    #[test]
    fn export_of_empty_seeded_stack_keeps_anchor() {
        let mut s = stack();
        s.open("agent-a", SpanType::Agent);
        let first = s.export();

        // A seeded stack that opened nothing still hands the anchor on.
        let seeded = SpanStack::from_snapshot(first.clone());
        let second = seeded.export();
        assert_eq!(second.span_id, first.span_id);
        assert_eq!(second.trace_id, first.trace_id);
    }

    #[test]
    fn snapshot_is_serializable() {
        let mut s = stack();
        s.open("a", SpanType::Agent);
        let snap = s.export();
        let json = serde_json::to_string(&snap).unwrap();
        let back: ContextSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn pop_span_discards_leaked_children() {
        let mut s = stack();
        let outer = s.open("outer", SpanType::Agent);
        s.open("leaked-1", SpanType::Section);
        s.open("leaked-2", SpanType::Section);

        let popped = s.pop_span(&outer).unwrap();
        assert_eq!(popped.span_id, outer);
        assert!(s.is_empty());
    }

    #[test]
    fn pop_span_of_unknown_id_is_noop() {
        let mut s = stack();
        s.open("a", SpanType::Agent);
        assert!(s.pop_span(&SpanId::from("nope")).is_none());
        assert_eq!(s.depth(), 1);
    }
}
