// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The terminal event record: span + usage + computed cost.
//!
//! One event is created per observed network call, at proxy-side parse
//! time. Events are immutable once handed to the emitter and are freed
//! when a batch is successfully flushed to the collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::span::Span;
use crate::usage::UsageRecord;

/// Terminal record combining a span, a usage record, and a computed cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub event_id: String,
    /// The span this call was attributed to.
    pub span: Span,
    /// Normalized usage extracted from the provider response.
    pub usage: UsageRecord,
    /// Computed cost in USD; 0.0 when unpriced.
    pub cost_usd: f64,
    /// True when no pricing rule matched; the cost is then exactly 0.0,
    /// never a guess.
    pub unpriced: bool,
    /// When the event was created.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Create a priced event.
    pub fn priced(span: Span, usage: UsageRecord, cost_usd: f64) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            span,
            usage,
            cost_usd,
            unpriced: false,
            created_at: Utc::now(),
        }
    }

    /// Create an event for which no pricing rule matched.
    pub fn unpriced(span: Span, usage: UsageRecord) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            span,
            usage,
            cost_usd: 0.0,
            unpriced: true,
            created_at: Utc::now(),
        }
    }
}
