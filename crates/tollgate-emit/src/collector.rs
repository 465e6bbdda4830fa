// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the collector's batch-ingestion endpoint.
//!
//! The collector itself is an external collaborator; this is the
//! submission side of its contract: `POST {base}/v1/events` with a JSON
//! body of `{"events": [...]}` where each entry is a serialized
//! [`Event`] (span, usage record, and computed cost).

use serde::Serialize;

use tollgate_core::{Event, TollgateError};

/// Batch submission request body.
#[derive(Debug, Serialize)]
struct EventBatch<'a> {
    events: &'a [Event],
}

/// Client for the collector ingestion endpoint.
#[derive(Debug, Clone)]
pub struct CollectorClient {
    client: reqwest::Client,
    endpoint: String,
}

impl CollectorClient {
    /// Create a client for the collector at `base_url`.
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/v1/events", base_url.trim_end_matches('/')),
        }
    }

    /// The full ingestion endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit one batch. Any non-success status is an error; the caller
    /// owns retry policy.
    pub async fn submit(&self, events: &[Event]) -> Result<(), TollgateError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EventBatch { events })
            .send()
            .await
            .map_err(|e| TollgateError::collector("collector unreachable", e))?;

        if !response.status().is_success() {
            return Err(TollgateError::Collector {
                message: format!("collector rejected batch: {}", response.status()),
                source: None,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_core::{RunId, Span, SpanType, UnitCounts, UsageRecord, UsageStatus};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event() -> Event {
        Event::priced(
            Span::root("llm", SpanType::Llm, RunId::from("r1")),
            UsageRecord {
                provider: "anthropic".into(),
                model_or_endpoint: Some("claude-sonnet-4".into()),
                units: UnitCounts::Tokens {
                    input: 10,
                    output: 5,
                    cached_input: 0,
                },
                status: UsageStatus::Parsed,
            },
            0.001,
        )
    }

    #[tokio::test]
    async fn submits_batch_to_ingest_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/events"))
            .and(body_partial_json(serde_json::json!({
                "events": [{"usage": {"provider": "anthropic"}}]
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = CollectorClient::new(reqwest::Client::new(), &server.uri());
        client.submit(&[event()]).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = CollectorClient::new(reqwest::Client::new(), &server.uri());
        let err = client.submit(&[event()]).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn endpoint_normalizes_trailing_slash() {
        let client = CollectorClient::new(reqwest::Client::new(), "http://c.example/");
        assert_eq!(client.endpoint(), "http://c.example/v1/events");
    }
}
