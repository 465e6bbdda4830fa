// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Priority-based resolution of which open span owns a network call.
//!
//! Ordering: explicit wrappers {agent, tool, llm} beat {section}, which
//! beats {http_fallback}. Among spans of the winning class the
//! innermost (closest to the top of the stack) wins. With no open span
//! the caller mints a fresh fallback root for that single event.

use tollgate_context::{with_current, ContextSnapshot};

/// Resolve the attachment point for a raw network call in the current
/// execution unit.
///
/// Returns the snapshot to stamp onto the outbound request, pointing at
/// the winning span. Returns `None` when no context is installed or
/// nothing is open and no imported anchor exists; the call is then
/// attributed to a fallback root minted where the event is built.
pub fn attachment_point() -> Option<ContextSnapshot> {
    with_current(|stack| {
        let max_class = stack.iter().map(|s| s.span_type.priority_class()).max();
        match max_class {
            Some(class) => {
                let winner = stack
                    .iter()
                    .rev()
                    .find(|s| s.span_type.priority_class() == class)
                    .map(|s| s.span_id.clone());
                let mut snapshot = stack.export();
                snapshot.span_id = winner;
                Some(snapshot)
            }
            // Empty stack: an imported anchor still attributes the call
            // to the exporting span; otherwise there is nothing to join.
            None => {
                let snapshot = stack.export();
                snapshot.span_id.is_some().then_some(snapshot)
            }
        }
    })
    .flatten()
}
