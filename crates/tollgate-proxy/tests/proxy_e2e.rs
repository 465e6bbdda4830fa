// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end proxy flow: forward to a mock upstream, parse usage,
//! price it, and flush the resulting event to a mock collector.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use http::HeaderMap;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tollgate_core::{PricingData, PricingRule, SpanType, UnitCounts, UsageRecord, UsageStatus, headers};
use tollgate_cost::InMemoryPricingStore;
use tollgate_emit::{CollectorClient, EmitterConfig, EventEmitter};
use tollgate_providers::{ProviderRegistry, UsageParser};
use tollgate_proxy::{ProxyState, server};

/// Test parser that claims every destination, parsing an
/// anthropic-shaped usage block. Registered first so the mock server's
/// loopback host is still detected.
struct LoopbackLlm;

impl UsageParser for LoopbackLlm {
    fn provider_id(&self) -> &'static str {
        "loopback-llm"
    }

    fn matches(&self, url: &str) -> bool {
        tollgate_providers::host_of(url) == "127.0.0.1"
    }

    fn call_span_type(&self) -> SpanType {
        SpanType::Llm
    }

    fn parse(&self, body: &[u8], _headers: &HeaderMap) -> UsageRecord {
        let json: serde_json::Value = match serde_json::from_slice(body) {
            Ok(json) => json,
            Err(_) => return UsageRecord::parse_failed(self.provider_id()),
        };
        UsageRecord {
            provider: self.provider_id().to_string(),
            model_or_endpoint: json
                .pointer("/model")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            units: UnitCounts::Tokens {
                input: json
                    .pointer("/usage/input_tokens")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0),
                output: json
                    .pointer("/usage/output_tokens")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0),
                cached_input: 0,
            },
            status: UsageStatus::Parsed,
        }
    }
}

fn pricing() -> InMemoryPricingStore {
    InMemoryPricingStore::new(vec![PricingRule {
        provider: "loopback-llm".into(),
        model_or_endpoint: Some("claude-sonnet-4".into()),
        pricing: PricingData::TokenBased {
            input_per_token: 0.000003,
            output_per_token: 0.000015,
            cached_input_per_token: 0.0,
        },
        effective_from: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        effective_until: None,
        active: true,
    }])
}

fn state(collector_url: &str) -> ProxyState {
    let mut registry = ProviderRegistry::new();
    registry.register(Box::new(LoopbackLlm));

    ProxyState {
        client: reqwest::Client::new(),
        registry: Arc::new(registry),
        pricing: Arc::new(pricing()),
        emitter: EventEmitter::new(
            CollectorClient::new(reqwest::Client::new(), collector_url),
            EmitterConfig {
                flush_interval: Duration::from_millis(50),
                batch_size: 1,
                ..EmitterConfig::default()
            },
        ),
    }
}

async fn serve(state: ProxyState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = server::router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn forwarded_call_is_relayed_parsed_priced_and_flushed() {
    let upstream = MockServer::start().await;
    let collector = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "claude-sonnet-4",
            "usage": {"input_tokens": 1000, "output_tokens": 500}
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/events"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&collector)
        .await;

    let state = state(&collector.uri());
    let flusher = state.emitter.start();
    let proxy_url = serve(state).await;

    let response = reqwest::Client::new()
        .post(format!("{proxy_url}/v1/messages"))
        .header(headers::TARGET, format!("{}/v1/messages", upstream.uri()))
        .header(headers::TRACE_ID, "trace-e2e")
        .header(headers::SPAN_ID, "span-tool-1")
        .header(headers::RUN_ID, "run-e2e")
        .header(headers::CUSTOMER_ID, "cust-e2e")
        .header("authorization", "Bearer sk-test")
        .json(&serde_json::json!({"model": "claude-sonnet-4", "max_tokens": 64}))
        .send()
        .await
        .unwrap();

    // Response relayed transparently.
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["usage"]["input_tokens"], 1000);

    // The event lands at the collector asynchronously.
    let mut received = Vec::new();
    for _ in 0..100 {
        received = collector.received_requests().await.unwrap();
        if !received.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(received.len(), 1, "expected one collector batch");

    let batch: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let event = &batch["events"][0];

    // New call span parented under the attributed span from the headers.
    assert_eq!(event["span"]["parent_span_id"], "span-tool-1");
    assert_eq!(event["span"]["trace_id"], "trace-e2e");
    assert_eq!(event["span"]["run_id"], "run-e2e");
    assert_eq!(event["span"]["customer_id"], "cust-e2e");
    assert_eq!(event["span"]["span_type"], "llm");
    assert_eq!(event["span"]["status"], "ok");

    // Usage parsed and priced: 1000 * 0.000003 + 500 * 0.000015.
    assert_eq!(event["usage"]["provider"], "loopback-llm");
    assert_eq!(event["unpriced"], false);
    let cost = event["cost_usd"].as_f64().unwrap();
    assert!((cost - 0.0105).abs() < 1e-9, "cost was {cost}");

    // Upstream never saw internal headers.
    let upstream_reqs = upstream.received_requests().await.unwrap();
    assert!(
        upstream_reqs[0]
            .headers
            .keys()
            .all(|name| !name.as_str().starts_with("x-tollgate-")),
        "internal headers leaked upstream"
    );

    flusher.abort();
}

#[tokio::test]
async fn missing_target_header_is_rejected() {
    let collector = MockServer::start().await;
    let proxy_url = serve(state(&collector.uri())).await;

    let response = reqwest::Client::new()
        .post(format!("{proxy_url}/v1/messages"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert!(response.text().await.unwrap().contains(headers::TARGET));
}

#[tokio::test]
async fn unreachable_upstream_is_a_bad_gateway() {
    let collector = MockServer::start().await;
    let proxy_url = serve(state(&collector.uri())).await;

    let response = reqwest::Client::new()
        .post(format!("{proxy_url}/v1/messages"))
        // Port 9 (discard) is never listening.
        .header(headers::TARGET, "http://127.0.0.1:9/v1/messages")
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
}

#[tokio::test]
async fn unattributed_call_gets_a_fallback_root_span() {
    let upstream = MockServer::start().await;
    let collector = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("model"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "claude-sonnet-4",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })))
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/events"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&collector)
        .await;

    let state = state(&collector.uri());
    let flusher = state.emitter.start();
    let proxy_url = serve(state).await;

    // Only the target header: no trace context at all.
    reqwest::Client::new()
        .post(format!("{proxy_url}/v1/messages"))
        .header(headers::TARGET, format!("{}/v1/messages", upstream.uri()))
        .json(&serde_json::json!({"model": "claude-sonnet-4"}))
        .send()
        .await
        .unwrap();

    let mut received = Vec::new();
    for _ in 0..100 {
        received = collector.received_requests().await.unwrap();
        if !received.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(received.len(), 1);

    let batch: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let event = &batch["events"][0];
    assert!(event["span"]["parent_span_id"].is_null());
    assert_eq!(event["span"]["span_type"], "http_fallback");

    flusher.abort();
}
