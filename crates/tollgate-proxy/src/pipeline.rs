// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-forward processing: parse usage, mint the call span, price it,
//! and hand the event to the emitter.
//!
//! Runs on a spawned task after the response has already been relayed,
//! so nothing here can add latency to the forwarded call. Every
//! observed call produces exactly one event; the span on that event is
//! a fresh call span whose parent is the attributed span carried in the
//! request headers, or a synthetic fallback root when the request
//! carried none.

use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;
use metrics::counter;
use tracing::warn;

use tollgate_core::{CustomerId, Event, RunId, Span, SpanId, SpanStatus, SpanType, TraceId};
use tollgate_cost::{Priced, price};

use crate::forward::TraceMeta;
use crate::server::ProxyState;

/// Build, price, and emit the event for one forwarded call.
pub async fn process(
    state: ProxyState,
    target: String,
    meta: TraceMeta,
    status: StatusCode,
    response_headers: HeaderMap,
    body: bytes::Bytes,
    upstream_elapsed: Duration,
) {
    let usage = state.registry.parse(&target, &body, &response_headers);
    let span_type = state.registry.call_span_type(&target);
    let span = call_span(&target, &usage.provider, span_type, &meta, status, upstream_elapsed);

    let priced = match price(state.pricing.as_ref(), &usage, Utc::now()).await {
        Ok(priced) => priced,
        Err(e) => {
            // A store failure must not lose the call record; emit it
            // unpriced instead.
            warn!(provider = usage.provider, error = %e, "pricing lookup failed");
            counter!("tollgate_pricing_failures").increment(1);
            Priced {
                cost_usd: 0.0,
                unpriced: true,
            }
        }
    };

    let event = if priced.unpriced {
        Event::unpriced(span, usage)
    } else {
        Event::priced(span, usage, priced.cost_usd)
    };
    state.emitter.add(event);
}

/// Mint the call span for one observed network call.
///
/// When the request carried an attributed span id, the call span
/// becomes its child; otherwise a fallback root is minted so the call
/// still lands in a trace. The span type comes from the detected
/// provider, so non-LLM traffic is not typed as an LLM call.
fn call_span(
    target: &str,
    provider: &str,
    span_type: SpanType,
    meta: &TraceMeta,
    status: StatusCode,
    upstream_elapsed: Duration,
) -> Span {
    let end = Utc::now();
    let start = end
        - chrono::Duration::from_std(upstream_elapsed).unwrap_or_else(|_| chrono::Duration::zero());
    let label = format!("{} {}", provider, tollgate_providers::host_of(target));
    let run_id = meta
        .run_id
        .as_deref()
        .map(RunId::from)
        .unwrap_or_else(RunId::new);

    let mut span = match meta.span_id.as_deref() {
        Some(parent) => Span {
            span_id: SpanId::new(),
            parent_span_id: Some(SpanId::from(parent)),
            trace_id: meta
                .trace_id
                .as_deref()
                .map(TraceId::from)
                .unwrap_or_else(TraceId::new),
            run_id,
            customer_id: meta.customer_id.as_deref().map(CustomerId::from),
            label,
            span_type,
            start_time: start,
            end_time: None,
            status: SpanStatus::Open,
            error: None,
        },
        None => {
            let mut span = Span::root(label, SpanType::HttpFallback, run_id);
            if let Some(trace_id) = meta.trace_id.as_deref() {
                span.trace_id = TraceId::from(trace_id);
            }
            span.customer_id = meta.customer_id.as_deref().map(CustomerId::from);
            span.start_time = start;
            span
        }
    };

    if status.is_success() || status.is_redirection() {
        span.close(SpanStatus::Ok);
    } else {
        span.close_with_error("http", format!("upstream returned {status}"));
    }
    span.end_time = Some(end);
    span
}
