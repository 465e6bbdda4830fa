// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound HTTP interception for Tollgate.
//!
//! Sits at the client layer every higher-level SDK ultimately goes
//! through: the [`TracedClient`] wraps a shared `reqwest::Client` and
//! stamps the current attribution context onto each outbound request as
//! transport metadata. The destination, method, body, and observable
//! response are never altered; the only visible change is the added
//! headers (and, when proxy routing is enabled, the hop through the
//! proxy, which forwards byte-for-byte).
//!
//! Requests to Tollgate's own control endpoints (the collector, the
//! proxy's health checks) are passed through untagged to avoid feedback
//! loops.

use reqwest::{Method, RequestBuilder};
use tracing::trace;

use tollgate_core::headers;
use tollgate_trace::attachment_point;

/// Interception settings.
#[derive(Debug, Clone, Default)]
pub struct InterceptConfig {
    /// When set, tagged requests are routed through the proxy at this
    /// base URL, carrying the real destination in the target header.
    pub proxy_url: Option<String>,
    /// URL prefixes that are never tagged or proxied (control
    /// endpoints: collector base URL, proxy base URL).
    pub exclude: Vec<String>,
}

/// A reqwest wrapper that tags outbound requests with the current span
/// chain. Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TracedClient {
    client: reqwest::Client,
    config: InterceptConfig,
}

impl TracedClient {
    /// Wrap an existing client.
    pub fn new(client: reqwest::Client, config: InterceptConfig) -> Self {
        Self { client, config }
    }

    /// Whether the URL is one of our own control endpoints.
    fn is_control_endpoint(&self, url: &str) -> bool {
        self.config.exclude.iter().any(|prefix| url.starts_with(prefix.as_str()))
    }

    /// Build a request to `url`, tagged with the current attribution
    /// context. Send it with the returned builder as usual.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        if self.is_control_endpoint(url) {
            return self.client.request(method, url);
        }

        let mut builder = match &self.config.proxy_url {
            Some(proxy) => {
                let path = path_and_query(url);
                let via = format!("{}{}", proxy.trim_end_matches('/'), path);
                trace!(target_url = url, via = %via, "routing request through proxy");
                self.client
                    .request(method, via)
                    .header(headers::TARGET, url)
            }
            None => self.client.request(method, url),
        };

        if let Some(snapshot) = attachment_point() {
            builder = builder
                .header(headers::TRACE_ID, snapshot.trace_id.as_str())
                .header(headers::RUN_ID, snapshot.run_id.as_str());
            if let Some(span_id) = &snapshot.span_id {
                builder = builder.header(headers::SPAN_ID, span_id.as_str());
            }
            if let Some(customer_id) = &snapshot.customer_id {
                builder = builder.header(headers::CUSTOMER_ID, customer_id.as_str());
            }
        }
        builder
    }

    /// Tagged GET request.
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// Tagged POST request.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// The wrapped client, for untagged internal use.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }
}

/// The path-and-query portion of a URL ("/v1/messages?x=1"), defaulting
/// to "/" for bare origins.
fn path_and_query(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    match rest.find('/') {
        Some(idx) => &rest[idx..],
        None => "/",
    }
}
