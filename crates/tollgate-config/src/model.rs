// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Tollgate.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject
//! unrecognized config keys at startup, providing actionable error
//! messages.

use serde::{Deserialize, Serialize};

/// Top-level Tollgate configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to
/// sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TollgateConfig {
    /// Proxy server settings.
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Collector endpoint and event batching settings.
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Pricing rule source settings.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Outbound interception settings.
    #[serde(default)]
    pub intercept: InterceptConfig,

    /// Logging settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Proxy server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyConfig {
    /// Address to bind.
    #[serde(default = "default_proxy_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_proxy_port")]
    pub port: u16,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_proxy_host(),
            port: default_proxy_port(),
        }
    }
}

fn default_proxy_host() -> String {
    "127.0.0.1".to_string()
}

fn default_proxy_port() -> u16 {
    8787
}

/// Collector endpoint and event batching configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    /// Base URL of the collector service events are flushed to.
    #[serde(default = "default_collector_url")]
    pub url: String,

    /// Flush at least this often, in milliseconds.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Flush as soon as this many events are buffered.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Hard cap on buffered events; beyond it the oldest are dropped.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Attempts per flush before the batch is retained for the next
    /// cycle.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retry attempts, in milliseconds (doubled each
    /// attempt).
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            url: default_collector_url(),
            flush_interval_ms: default_flush_interval_ms(),
            batch_size: default_batch_size(),
            buffer_capacity: default_buffer_capacity(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

fn default_collector_url() -> String {
    "http://127.0.0.1:8790".to_string()
}

fn default_flush_interval_ms() -> u64 {
    5000
}

fn default_batch_size() -> usize {
    64
}

fn default_buffer_capacity() -> usize {
    4096
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    250
}

/// Pricing rule source configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    /// Path to a JSON file of pricing rules loaded into the in-memory
    /// store at startup. When unset the proxy runs with no rules and
    /// every event is flagged unpriced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<String>,
}

/// Outbound interception configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InterceptConfig {
    /// Proxy base URL outbound calls are routed through. When unset,
    /// calls go direct and only gain metadata headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,

    /// URL prefixes excluded from tagging and routing (control
    /// endpoints such as the collector itself).
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Logging level (trace, debug, info, warn, error). `RUST_LOG`
    /// overrides this when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
