// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transparent metering reverse proxy.
//!
//! Accepts a tagged request, forwards it byte-for-byte to the real
//! destination named in the target header, and returns the upstream
//! response unmodified apart from stripping internal routing headers.
//! Parsing, costing, and emission run in a detached task after the
//! response is on its way, never on the request's critical path. The
//! proxy keeps no per-request state and can be replicated horizontally;
//! the only shared pieces are the outbound connection pool, the
//! provider registry, the pricing store handle, and the event buffer.

pub mod forward;
pub mod pipeline;
pub mod server;

pub use server::{start_server, ProxyConfig, ProxyState};
