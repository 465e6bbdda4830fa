// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tollgate cost-tracing pipeline.

use thiserror::Error;

/// The primary error type used across all Tollgate crates.
#[derive(Debug, Error)]
pub enum TollgateError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport errors (proxy bind failure, upstream unreachable, TLS).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Collector ingestion errors (batch submission rejected or unreachable).
    #[error("collector error: {message}")]
    Collector {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Pricing store errors (lookup backend failure, not rule-miss).
    #[error("pricing store error: {message}")]
    Pricing {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TollgateError {
    /// Wrap an arbitrary error as a transport error with context.
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wrap an arbitrary error as a collector error with context.
    pub fn collector(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Collector {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
