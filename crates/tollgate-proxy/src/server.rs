// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proxy HTTP server built on axum.
//!
//! Health and readiness are plain endpoints; every other method/path
//! combination is the forwarding surface.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use tollgate_core::TollgateError;
use tollgate_cost::PricingStore;
use tollgate_emit::EventEmitter;
use tollgate_providers::ProviderRegistry;

use crate::forward;

/// Shared state for the proxy handlers.
#[derive(Clone)]
pub struct ProxyState {
    /// Outbound client used for upstream forwarding.
    pub client: reqwest::Client,
    /// Provider detection and parsing registry.
    pub registry: Arc<ProviderRegistry>,
    /// Pricing store collaborator.
    pub pricing: Arc<dyn PricingStore>,
    /// Event buffer shared with the background flusher.
    pub emitter: EventEmitter,
}

/// Proxy server configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn get_ready() -> Json<serde_json::Value> {
    // Stateless between requests: once serving, the proxy is ready.
    Json(serde_json::json!({"ready": true}))
}

/// Build the proxy router. Exposed separately for in-process tests.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/ready", get(get_ready))
        .fallback(forward::forward)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the proxy server on the configured host and port.
pub async fn start_server(config: &ProxyConfig, state: ProxyState) -> Result<(), TollgateError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TollgateError::transport(format!("failed to bind proxy to {addr}"), e))?;

    tracing::info!("Proxy server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| TollgateError::transport("proxy server error", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_cost::InMemoryPricingStore;
    use tollgate_emit::{CollectorClient, EmitterConfig};
    use tower::ServiceExt;

    fn test_state() -> ProxyState {
        ProxyState {
            client: reqwest::Client::new(),
            registry: Arc::new(ProviderRegistry::with_builtins()),
            pricing: Arc::new(InMemoryPricingStore::default()),
            emitter: EventEmitter::new(
                CollectorClient::new(reqwest::Client::new(), "http://127.0.0.1:9"),
                EmitterConfig::default(),
            ),
        }
    }

    #[tokio::test]
    async fn health_and_ready_respond() {
        let app = router(test_state());

        let response = app
            .clone()
            .oneshot(
                axum::http::Request::get("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let response = app
            .oneshot(
                axum::http::Request::get("/ready")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }
}
