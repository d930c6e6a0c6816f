use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use serde::Serialize;

/// Process-wide counters. All atomic, cheap to clone.
#[derive(Clone, Default)]
pub struct Metrics {
    /// Study plans generated successfully
    pub plans_generated: Arc<AtomicU64>,
    /// Plan requests rejected by validation
    pub plans_rejected: Arc<AtomicU64>,
    /// Model call latency in milliseconds (sum)
    pub model_latency_ms: Arc<AtomicU64>,
    pub model_calls: Arc<AtomicU64>,
    pub model_failures: Arc<AtomicU64>,
    pub cache_hit_count: Arc<AtomicU64>,
    pub cache_miss_count: Arc<AtomicU64>,
    pub errors_total: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub plans_generated: u64,
    pub plans_rejected: u64,
    pub model_latency_ms: u64,
    pub model_calls: u64,
    pub model_failures: u64,
    pub cache_hit_count: u64,
    pub cache_miss_count: u64,
    pub errors_total: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_plan_generated(&self) {
        bump(&self.plans_generated);
    }

    pub fn record_plan_rejected(&self) {
        bump(&self.plans_rejected);
    }

    /// Record one successful model call and its latency
    pub fn record_model_call(&self, ms: u64) {
        bump(&self.model_calls);
        self.model_latency_ms.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn record_model_failure(&self) {
        bump(&self.model_failures);
    }

    pub fn record_cache_hit(&self) {
        bump(&self.cache_hit_count);
    }

    pub fn record_cache_miss(&self) {
        bump(&self.cache_miss_count);
    }

    pub fn record_error(&self) {
        bump(&self.errors_total);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let read = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            plans_generated: read(&self.plans_generated),
            plans_rejected: read(&self.plans_rejected),
            model_latency_ms: read(&self.model_latency_ms),
            model_calls: read(&self.model_calls),
            model_failures: read(&self.model_failures),
            cache_hit_count: read(&self.cache_hit_count),
            cache_miss_count: read(&self.cache_miss_count),
            errors_total: read(&self.errors_total),
        }
    }
}
