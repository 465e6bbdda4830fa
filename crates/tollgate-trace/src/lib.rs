// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Span attribution engine for Tollgate.
//!
//! Wraps agent, tool, and LLM entrypoints so spans open and close around
//! user code with guaranteed release, normalizes heterogeneous tool
//! collections at registration, and resolves which open span owns an
//! observed network call.

pub mod attribution;
pub mod guard;
pub mod tools;

pub use attribution::attachment_point;
pub use guard::{traced, traced_agent, traced_llm, traced_section, traced_tool, SpanGuard};
pub use tools::{trace_tool, Tool, ToolCollection, ToolError, ToolSet, TracedTool};
