// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The forwarding handler.
//!
//! Forwards the request byte-for-byte to the destination named in the
//! target header and relays the upstream response unmodified, minus
//! internal routing headers. No retries: an unreachable upstream comes
//! back as 502 with the transport error text, so the caller's own retry
//! semantics stay intact.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use metrics::histogram;
use tracing::warn;

use tollgate_core::headers;

use crate::pipeline;
use crate::server::ProxyState;

/// Forwarded bodies are buffered; 64 MiB covers any provider payload.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Attribution metadata lifted off the inbound request headers.
#[derive(Debug, Clone, Default)]
pub struct TraceMeta {
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub run_id: Option<String>,
    pub customer_id: Option<String>,
}

impl TraceMeta {
    /// Read the metadata headers, tolerating absence of any of them.
    pub fn from_headers(headers_in: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers_in
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            trace_id: get(headers::TRACE_ID),
            span_id: get(headers::SPAN_ID),
            run_id: get(headers::RUN_ID),
            customer_id: get(headers::CUSTOMER_ID),
        }
    }
}

/// Headers never forwarded upstream: our own metadata plus the ones the
/// outbound client recomputes.
fn strip_for_upstream(name: &HeaderName) -> bool {
    let name = name.as_str();
    name.starts_with("x-tollgate-") || name == "host" || name == "content-length"
}

/// Headers never relayed back to the caller: anything internal plus
/// framing headers invalidated by buffering.
fn strip_for_caller(name: &HeaderName) -> bool {
    let name = name.as_str();
    name.starts_with("x-tollgate-")
        || name == "transfer-encoding"
        || name == "connection"
        || name == "content-length"
}

/// Catch-all forwarding handler for every method and path.
pub async fn forward(State(state): State<ProxyState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let Some(target) = parts
        .headers
        .get(headers::TARGET)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    else {
        return (
            StatusCode::BAD_REQUEST,
            format!("missing {} header", headers::TARGET),
        )
            .into_response();
    };

    let meta = TraceMeta::from_headers(&parts.headers);

    let body_bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("unreadable body: {e}")).into_response();
        }
    };

    let mut upstream_headers = HeaderMap::new();
    for (name, value) in parts.headers.iter() {
        if !strip_for_upstream(name) {
            upstream_headers.append(name.clone(), value.clone());
        }
    }

    let started = std::time::Instant::now();
    let result = state
        .client
        .request(parts.method.clone(), &target)
        .headers(upstream_headers)
        .body(body_bytes)
        .send()
        .await;

    let upstream = match result {
        Ok(upstream) => upstream,
        Err(e) => {
            // Transport errors propagate transparently; no retry here.
            warn!(target_url = %target, error = %e, "upstream request failed");
            return (StatusCode::BAD_GATEWAY, format!("upstream error: {e}")).into_response();
        }
    };

    let status = upstream.status();
    let response_headers = upstream.headers().clone();
    let response_body = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(target_url = %target, error = %e, "failed to read upstream body");
            return (StatusCode::BAD_GATEWAY, format!("upstream body error: {e}")).into_response();
        }
    };
    let elapsed = started.elapsed();
    histogram!("tollgate_proxy_upstream_seconds").record(elapsed.as_secs_f64());

    // Parse/cost/emit happens after the response is built, off the
    // request's critical path.
    tokio::spawn(pipeline::process(
        state.clone(),
        target,
        meta,
        status,
        response_headers.clone(),
        response_body.clone(),
        elapsed,
    ));

    let mut builder = Response::builder().status(status);
    for (name, value) in response_headers.iter() {
        if !strip_for_caller(name) {
            builder = builder.header(name, value);
        }
    }
    builder
        .body(Body::from(response_body))
        .unwrap_or_else(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("response build error: {e}"),
            )
                .into_response()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_reads_present_headers_only() {
        let mut map = HeaderMap::new();
        map.insert(headers::TRACE_ID, "t-1".parse().unwrap());
        map.insert(headers::SPAN_ID, "s-1".parse().unwrap());

        let meta = TraceMeta::from_headers(&map);
        assert_eq!(meta.trace_id.as_deref(), Some("t-1"));
        assert_eq!(meta.span_id.as_deref(), Some("s-1"));
        assert!(meta.run_id.is_none());
        assert!(meta.customer_id.is_none());
    }

    #[test]
    fn internal_headers_are_stripped_both_ways() {
        let internal: HeaderName = headers::TARGET.parse().unwrap();
        let ordinary: HeaderName = "authorization".parse().unwrap();

        assert!(strip_for_upstream(&internal));
        assert!(!strip_for_upstream(&ordinary));
        assert!(strip_for_caller(&internal));
        assert!(!strip_for_caller(&ordinary));
    }
}
