//! Usage metrics: durable counters plus fire-and-forget metric events.
//!
//! Counters back "running maximum" gauges. A counter is incremented in the
//! [`CounterStore`] and its new value is fired as a `max` metric. Counter
//! failures are never fatal: they are logged and read as zero.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

/// How the metrics backend folds fired values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    Avg,
    Max,
}

#[derive(Debug, Error)]
#[error("counter `{key}` unavailable: {reason}")]
pub struct CounterError {
    pub key: String,
    pub reason: String,
}

/// Durable key-value increment.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Add `amount` and return the new value.
    async fn incr(&self, key: &str, amount: i64) -> Result<i64, CounterError>;
}

/// Destination for metric events, grouped by named store.
pub trait MetricsSink: Send + Sync {
    fn fire(&self, store: &str, metric: &str, value: f64, aggregation: Aggregation);
}

/// Counters shared by every turn in the process. Increments are atomic, so
/// concurrent turns for different users never lose updates.
#[derive(Debug, Default)]
pub struct InMemoryCounters {
    counters: Mutex<HashMap<String, Arc<AtomicI64>>>,
}

impl InMemoryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, key: &str) -> Arc<AtomicI64> {
        let mut counters = self
            .counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        counters
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AtomicI64::new(0)))
            .clone()
    }

    pub fn get(&self, key: &str) -> i64 {
        self.counter(key).load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CounterStore for InMemoryCounters {
    async fn incr(&self, key: &str, amount: i64) -> Result<i64, CounterError> {
        Ok(self.counter(key).fetch_add(amount, Ordering::SeqCst) + amount)
    }
}

/// Every value fired for one metric, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub aggregation: Aggregation,
    pub values: Vec<f64>,
}

/// Keeps fired metrics in memory, keyed by store and metric name.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    fired: Mutex<HashMap<(String, String), MetricSeries>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series(&self, store: &str, metric: &str) -> Option<MetricSeries> {
        self.lock()
            .get(&(store.to_string(), metric.to_string()))
            .cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), MetricSeries>> {
        self.fired.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MetricsSink for InMemoryMetrics {
    fn fire(&self, store: &str, metric: &str, value: f64, aggregation: Aggregation) {
        self.lock()
            .entry((store.to_string(), metric.to_string()))
            .or_insert_with(|| MetricSeries {
                aggregation,
                values: Vec::new(),
            })
            .values
            .push(value);
    }
}

/// Emits metric events as structured log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMetrics;

impl MetricsSink for LogMetrics {
    fn fire(&self, store: &str, metric: &str, value: f64, aggregation: Aggregation) {
        tracing::info!(target: "metrics", store, metric, value, ?aggregation, "metric fired");
    }
}

/// Metric helpers bound to the configured store name.
#[derive(Clone)]
pub struct Metrics {
    store: String,
    sink: Arc<dyn MetricsSink>,
    counters: Arc<dyn CounterStore>,
}

impl Metrics {
    pub fn new(
        store: impl Into<String>,
        sink: Arc<dyn MetricsSink>,
        counters: Arc<dyn CounterStore>,
    ) -> Self {
        Self {
            store: store.into(),
            sink,
            counters,
        }
    }

    pub fn fire_inc(&self, metric: &str) {
        tracing::debug!(metric, "fire_inc");
        self.sink.fire(&self.store, metric, 1.0, Aggregation::Sum);
    }

    pub fn fire_avg(&self, metric: &str, value: f64) {
        tracing::debug!(metric, value, "fire_avg");
        self.sink.fire(&self.store, metric, value, Aggregation::Avg);
    }

    pub fn fire_max(&self, metric: &str, value: f64) {
        tracing::debug!(metric, value, "fire_max");
        self.sink.fire(&self.store, metric, value, Aggregation::Max);
    }

    /// Bump the durable counter `metrics.<metric>` and fire its new value as
    /// a running maximum. Returns the value fired.
    pub async fn incr_metric(&self, metric: &str) -> i64 {
        let key = format!("metrics.{metric}");
        let value = match self.counters.incr(&key, 1).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to increment metric {metric}: {e}");
                0
            }
        };
        self.fire_max(metric, value as f64);
        value
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").field("store", &self.store).finish()
    }
}
