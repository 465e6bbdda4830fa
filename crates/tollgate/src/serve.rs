// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `tollgate serve` command: wires config into the running proxy.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use tollgate_config::TollgateConfig;
use tollgate_config::model::CollectorConfig;
use tollgate_core::{PricingRule, TollgateError};
use tollgate_cost::InMemoryPricingStore;
use tollgate_emit::{CollectorClient, EmitterConfig, EventEmitter};
use tollgate_providers::ProviderRegistry;
use tollgate_proxy::{ProxyConfig, ProxyState};

/// Runs the `tollgate serve` command.
///
/// Builds the shared proxy state from config, starts the background
/// event flusher, and serves until interrupted. On shutdown the buffer
/// is force-drained so in-flight events are not lost.
pub async fn run_serve(config: TollgateConfig) -> Result<(), TollgateError> {
    init_tracing(&config.telemetry.log_level);

    info!("starting tollgate serve");

    let pricing = load_pricing_store(config.pricing.rules_file.as_deref())?;

    let client = reqwest::Client::new();
    let collector = CollectorClient::new(client.clone(), &config.collector.url);
    let emitter = EventEmitter::new(collector, emitter_config(&config.collector));
    let flusher = emitter.start();

    let state = ProxyState {
        client,
        registry: Arc::new(ProviderRegistry::with_builtins()),
        pricing: Arc::new(pricing),
        emitter: emitter.clone(),
    };
    let proxy_config = ProxyConfig {
        host: config.proxy.host.clone(),
        port: config.proxy.port,
    };

    tokio::select! {
        result = tollgate_proxy::start_server(&proxy_config, state) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    match emitter.shutdown(flusher).await {
        Ok(flushed) => info!(events = flushed, "final flush complete"),
        Err(e) => warn!(error = %e, "final flush failed; buffered events lost"),
    }

    Ok(())
}

/// Load pricing rules from the configured JSON file, or start empty.
///
/// With no rules every event is emitted with cost 0 and the unpriced
/// flag set, so running without a rules file is safe but loud.
fn load_pricing_store(rules_file: Option<&str>) -> Result<InMemoryPricingStore, TollgateError> {
    let Some(path) = rules_file else {
        warn!("no pricing.rules_file configured; all events will be unpriced");
        return Ok(InMemoryPricingStore::default());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| TollgateError::Config(format!("cannot read pricing rules file {path}: {e}")))?;
    let rules: Vec<PricingRule> = serde_json::from_str(&content)
        .map_err(|e| TollgateError::Config(format!("invalid pricing rules in {path}: {e}")))?;

    info!(rules = rules.len(), path, "pricing rules loaded");
    Ok(InMemoryPricingStore::new(rules))
}

fn emitter_config(collector: &CollectorConfig) -> EmitterConfig {
    EmitterConfig {
        flush_interval: Duration::from_millis(collector.flush_interval_ms),
        batch_size: collector.batch_size,
        buffer_capacity: collector.buffer_capacity,
        max_retries: collector.max_retries,
        retry_backoff: Duration::from_millis(collector.retry_backoff_ms),
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tollgate={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
