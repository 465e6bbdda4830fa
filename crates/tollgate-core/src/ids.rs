// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Newtype identifiers shared across the tracing pipeline.
//!
//! All ids are opaque strings (UUID v4 when minted locally, but imports
//! from other processes are accepted verbatim).

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Mint a fresh random identifier.
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// View the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

id_type! {
    /// Identifies one root execution: all spans sharing a root share this.
    TraceId
}

id_type! {
    /// Identifies a single span (one tracked unit of work).
    SpanId
}

id_type! {
    /// Identifies one application-level run (e.g. a workflow invocation).
    RunId
}

id_type! {
    /// Identifies the end customer the work is billed against.
    CustomerId
}
