// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, sane batching bounds, and
//! well-formed URLs.

use crate::diagnostic::ConfigError;
use crate::model::TollgateConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &TollgateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.proxy.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "proxy.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("proxy.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.proxy.port == 0 {
        errors.push(ConfigError::Validation {
            message: "proxy.port must not be 0".to_string(),
        });
    }

    let url = config.collector.url.trim();
    if url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "collector.url must not be empty".to_string(),
        });
    } else if !url.starts_with("http://") && !url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("collector.url `{url}` must start with http:// or https://"),
        });
    }

    if config.collector.batch_size == 0 {
        errors.push(ConfigError::Validation {
            message: "collector.batch_size must be at least 1".to_string(),
        });
    }

    if config.collector.buffer_capacity < config.collector.batch_size {
        errors.push(ConfigError::Validation {
            message: format!(
                "collector.buffer_capacity ({}) must be at least collector.batch_size ({})",
                config.collector.buffer_capacity, config.collector.batch_size
            ),
        });
    }

    if config.collector.flush_interval_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "collector.flush_interval_ms must be at least 1".to_string(),
        });
    }

    if let Some(rules_file) = &config.pricing.rules_file
        && rules_file.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "pricing.rules_file must not be empty when set".to_string(),
        });
    }

    if let Some(proxy_url) = &config.intercept.proxy_url
        && !proxy_url.starts_with("http://")
        && !proxy_url.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "intercept.proxy_url `{proxy_url}` must start with http:// or https://"
            ),
        });
    }

    for (i, prefix) in config.intercept.exclude.iter().enumerate() {
        if prefix.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("intercept.exclude[{i}] must not be empty"),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
