// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Buffered event emitter with background batch flushing.
//!
//! `add()` never blocks the host application: events go into a bounded
//! in-memory buffer, and once the buffer is full the oldest event is
//! dropped with a warning instead of growing memory or back-pressuring
//! the caller. A background task flushes on a fixed interval or when a
//! batch's worth of events is waiting, whichever comes first. Flush
//! failures are retried with backoff up to a bound; the batch is
//! retained (within the buffer bound) across failures.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use metrics::counter;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tollgate_core::{Event, TollgateError};

use crate::collector::CollectorClient;

/// Emitter tuning knobs.
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Flush at least this often.
    pub flush_interval: Duration,
    /// Flush as soon as this many events are buffered.
    pub batch_size: usize,
    /// Hard cap on buffered events; beyond it the oldest are dropped.
    pub buffer_capacity: usize,
    /// Attempts per flush before giving the interval another turn.
    pub max_retries: u32,
    /// Base delay between retry attempts (doubled each attempt).
    pub retry_backoff: Duration,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(5),
            batch_size: 64,
            buffer_capacity: 4096,
            max_retries: 3,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

struct Inner {
    buffer: Mutex<VecDeque<Event>>,
    config: EmitterConfig,
    collector: CollectorClient,
    dropped: AtomicU64,
    batch_ready: Notify,
}

/// Handle to the event buffer. Cheap to clone; all clones share one
/// buffer, which is the only state shared across execution units.
#[derive(Clone)]
pub struct EventEmitter {
    inner: Arc<Inner>,
}

impl EventEmitter {
    /// Create an emitter flushing to the given collector.
    pub fn new(collector: CollectorClient, config: EmitterConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                buffer: Mutex::new(VecDeque::with_capacity(config.batch_size)),
                config,
                collector,
                dropped: AtomicU64::new(0),
                batch_ready: Notify::new(),
            }),
        }
    }

    /// Buffer an event. Never blocks; drops the oldest buffered event
    /// with a warning when the buffer is at capacity.
    pub fn add(&self, event: Event) {
        let notify = {
            let mut buffer = self.inner.buffer.lock().unwrap_or_else(|e| e.into_inner());
            if buffer.len() >= self.inner.config.buffer_capacity {
                let oldest = buffer.pop_front();
                self.inner.dropped.fetch_add(1, Ordering::Relaxed);
                counter!("tollgate_events_dropped").increment(1);
                warn!(
                    event_id = oldest.map(|e| e.event_id).as_deref().unwrap_or(""),
                    capacity = self.inner.config.buffer_capacity,
                    "event buffer full; dropping oldest event"
                );
            }
            buffer.push_back(event);
            buffer.len() >= self.inner.config.batch_size
        };
        counter!("tollgate_events_buffered").increment(1);
        if notify {
            self.inner.batch_ready.notify_one();
        }
    }

    /// Number of events currently buffered.
    pub fn buffered(&self) -> usize {
        self.inner.buffer.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Total events dropped due to the buffer bound.
    pub fn dropped(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    fn take_batch(&self, max: usize) -> Vec<Event> {
        let mut buffer = self.inner.buffer.lock().unwrap_or_else(|e| e.into_inner());
        let n = buffer.len().min(max);
        buffer.drain(..n).collect()
    }

    fn put_back(&self, batch: Vec<Event>) {
        let mut buffer = self.inner.buffer.lock().unwrap_or_else(|e| e.into_inner());
        for event in batch.into_iter().rev() {
            buffer.push_front(event);
        }
        // Reinsertion may overflow the bound if events arrived meanwhile;
        // the front of the buffer holds the oldest events, so drop there.
        while buffer.len() > self.inner.config.buffer_capacity {
            buffer.pop_front();
            self.inner.dropped.fetch_add(1, Ordering::Relaxed);
            counter!("tollgate_events_dropped").increment(1);
            warn!("event buffer overflow while retaining failed batch; dropping oldest event");
        }
    }

    /// Flush one batch with bounded retries.
    ///
    /// On persistent failure the batch is retained for the next cycle
    /// (subject to the buffer bound) and the last error is returned.
    pub async fn flush_once(&self) -> Result<usize, TollgateError> {
        let batch = self.take_batch(self.inner.config.batch_size);
        if batch.is_empty() {
            return Ok(0);
        }

        let mut backoff = self.inner.config.retry_backoff;
        let mut last_err = None;
        for attempt in 0..=self.inner.config.max_retries {
            match self.inner.collector.submit(&batch).await {
                Ok(()) => {
                    let n = batch.len();
                    counter!("tollgate_events_flushed").increment(n as u64);
                    debug!(events = n, "flushed event batch");
                    return Ok(n);
                }
                Err(err) => {
                    warn!(attempt, error = %err, "event batch flush failed");
                    last_err = Some(err);
                    if attempt < self.inner.config.max_retries {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        self.put_back(batch);
        Err(last_err.unwrap_or(TollgateError::Internal("flush failed".into())))
    }

    /// Drain everything buffered, for clean shutdown.
    pub async fn flush_all(&self) -> Result<usize, TollgateError> {
        let mut total = 0;
        loop {
            match self.flush_once().await? {
                0 => return Ok(total),
                n => total += n,
            }
        }
    }

    /// Stop the background flusher and force-drain the buffer.
    pub async fn shutdown(&self, flusher: JoinHandle<()>) -> Result<usize, TollgateError> {
        flusher.abort();
        self.flush_all().await
    }

    /// Start the background flusher. Flushes on the configured interval
    /// or as soon as a full batch is waiting, whichever comes first.
    /// Abort the handle (after a final `flush_all`) to stop.
    pub fn start(&self) -> JoinHandle<()> {
        let emitter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(emitter.inner.config.flush_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(
                interval_ms = emitter.inner.config.flush_interval.as_millis() as u64,
                batch_size = emitter.inner.config.batch_size,
                "event flusher started"
            );
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = emitter.inner.batch_ready.notified() => {}
                }
                // Collector-unreachable is already logged and bounded;
                // the loop just moves on to the next trigger.
                let _ = emitter.flush_once().await;
            }
        })
    }
}
