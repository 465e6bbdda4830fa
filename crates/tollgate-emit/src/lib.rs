// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event emission for Tollgate: bounded buffering and batched delivery
//! to the collector collaborator.

pub mod collector;
pub mod emitter;

pub use collector::CollectorClient;
pub use emitter::{EmitterConfig, EventEmitter};
