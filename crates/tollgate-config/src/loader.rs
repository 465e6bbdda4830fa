// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tollgate.toml` > `~/.config/tollgate/tollgate.toml`
//! > `/etc/tollgate/tollgate.toml` with environment variable overrides
//! via the `TOLLGATE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TollgateConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tollgate/tollgate.toml` (system-wide)
/// 3. `~/.config/tollgate/tollgate.toml` (user XDG config)
/// 4. `./tollgate.toml` (local directory)
/// 5. `TOLLGATE_*` environment variables
pub fn load_config() -> Result<TollgateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TollgateConfig::default()))
        .merge(Toml::file("/etc/tollgate/tollgate.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tollgate/tollgate.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tollgate.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<TollgateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TollgateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TollgateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TollgateConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity
/// with underscore-containing key names: `TOLLGATE_COLLECTOR_BATCH_SIZE`
/// must map to `collector.batch_size`, not `collector.batch.size`.
fn env_provider() -> Env {
    Env::prefixed("TOLLGATE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("proxy_", "proxy.", 1)
            .replacen("collector_", "collector.", 1)
            .replacen("pricing_", "pricing.", 1)
            .replacen("intercept_", "intercept.", 1)
            .replacen("telemetry_", "telemetry.", 1);
        mapped.into()
    })
}
