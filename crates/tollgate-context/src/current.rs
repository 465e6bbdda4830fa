// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Installation of a `SpanStack` as the current context for an
//! execution unit.
//!
//! Async tasks get their stack through a tokio `task_local!`, which is
//! inherited across `.await` points within the scoped future but NOT
//! into `tokio::spawn`ed children. Spawning child work therefore
//! requires an explicit hand-off:
//!
//! ```ignore
//! let snapshot = tollgate_context::export().unwrap();
//! tokio::spawn(tollgate_context::scope_snapshot(snapshot, async move {
//!     // spans opened here chain from the exporting span
//! }));
//! ```
//!
//! Synchronous code (threads without a runtime) uses a thread-local
//! slot installed by [`sync_scope`]. Both storages hold the stack by
//! value; no stack is ever reachable from two units at once.

use std::cell::RefCell;
use std::future::Future;

use tollgate_core::{CustomerId, RunId};

use crate::stack::{ContextSnapshot, SpanStack};

tokio::task_local! {
    static TASK_STACK: RefCell<SpanStack>;
}

thread_local! {
    static THREAD_STACK: RefCell<Option<SpanStack>> = const { RefCell::new(None) };
}

/// Run a future with the given stack installed as its context.
///
/// The stack is dropped when the future completes (or is cancelled);
/// open spans at that point are the caller's bug and are logged by the
/// guards that own them, not here.
pub async fn scope<F: Future>(stack: SpanStack, fut: F) -> F::Output {
    TASK_STACK.scope(RefCell::new(stack), fut).await
}

/// Run a future with a fresh stack for the given run.
pub async fn scope_new<F: Future>(
    run_id: RunId,
    customer_id: Option<CustomerId>,
    fut: F,
) -> F::Output {
    scope(SpanStack::new(run_id, customer_id), fut).await
}

/// Run a future with a stack seeded from an exported snapshot.
pub async fn scope_snapshot<F: Future>(snapshot: ContextSnapshot, fut: F) -> F::Output {
    scope(SpanStack::from_snapshot(snapshot), fut).await
}

/// Run a synchronous closure with the given stack installed for the
/// current thread. Restores the previous thread context on exit,
/// including on panic.
pub fn sync_scope<R>(stack: SpanStack, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<SpanStack>);
    impl Drop for Restore {
        fn drop(&mut self) {
            THREAD_STACK.with(|slot| *slot.borrow_mut() = self.0.take());
        }
    }

    let previous = THREAD_STACK.with(|slot| slot.borrow_mut().replace(stack));
    let _restore = Restore(previous);
    f()
}

/// Access the current unit's stack, if one is installed.
///
/// Prefers the task-local stack (async context), falling back to the
/// thread-local one. Returns `None` when no context is installed, which
/// callers treat as "tracing disabled here".
pub fn with_current<R>(f: impl FnOnce(&mut SpanStack) -> R) -> Option<R> {
    let mut f = Some(f);
    if let Ok(result) = TASK_STACK.try_with(|cell| (f.take().unwrap())(&mut cell.borrow_mut())) {
        return Some(result);
    }
    let f = f.take().unwrap();
    THREAD_STACK.with(|slot| slot.borrow_mut().as_mut().map(f))
}

/// Export the current unit's position for hand-off, if a context is
/// installed.
pub fn export() -> Option<ContextSnapshot> {
    with_current(|stack| stack.export())
}
