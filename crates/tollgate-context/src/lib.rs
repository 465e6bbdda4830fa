// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context propagation core for Tollgate.
//!
//! Maintains one span stack per logical execution unit and provides the
//! export/import mechanism for carrying attribution context across
//! threads, tasks, and process boundaries. Stacks are never shared
//! between concurrently running units, so none of this needs a lock.

pub mod current;
pub mod stack;

pub use current::{export, scope, scope_new, scope_snapshot, sync_scope, with_current};
pub use stack::{ContextSnapshot, SpanStack};
