use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use parking_lot::RwLock;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Calls go through
    Closed,
    /// Too many failures, calls are refused until the cooldown passes
    Open,
    /// Cooldown passed, the next call decides
    HalfOpen,
}

/// Guards the generation API so a dead endpoint isn't hammered on every request.
#[derive(Clone)]
pub struct CircuitBreaker {
    failures: Arc<AtomicU64>,
    opened_at: Arc<RwLock<Option<Instant>>>,
    cooldown: Duration,
    failure_threshold: u64,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u64) -> Self {
        CircuitBreaker {
            failures: Arc::new(AtomicU64::new(0)),
            opened_at: Arc::new(RwLock::new(None)),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    pub fn state(&self) -> BreakerState {
        match *self.opened_at.read() {
            None => BreakerState::Closed,
            Some(at) if at.elapsed() >= self.cooldown => BreakerState::HalfOpen,
            Some(_) => BreakerState::Open,
        }
    }

    /// False while open.
    pub fn allow_request(&self) -> bool {
        self.state() != BreakerState::Open
    }

    pub fn record_success(&self) {
        self.failures.store(0, Ordering::Relaxed);
        *self.opened_at.write() = None;
    }

    pub fn record_failure(&self) {
        let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
        let mut opened_at = self.opened_at.write();
        // A failed half-open probe re-opens for a full cooldown
        if failures >= self.failure_threshold || opened_at.is_some() {
            *opened_at = Some(Instant::now());
        }
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(Duration::from_secs(30), 3)
    }
}

/// Exponential backoff calculator
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    initial_delay_ms: u64,
    max_delay_ms: u64,
    multiplier: f64,
}

impl ExponentialBackoff {
    pub fn new(initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        ExponentialBackoff {
            initial_delay_ms,
            max_delay_ms,
            multiplier: 2.0,
        }
    }

    /// Delay before retry number `attempt` (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(32) as i32;
        let delay = (self.initial_delay_ms as f64 * self.multiplier.powi(exponent)) as u64;
        Duration::from_millis(delay.min(self.max_delay_ms))
    }

    /// Same as `delay_for_attempt` plus up to 25% random jitter, still capped.
    pub fn jittered<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let base = self.delay_for_attempt(attempt).as_millis() as u64;
        let jitter = rng.gen_range(0..=base / 4);
        Duration::from_millis((base + jitter).min(self.max_delay_ms))
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(250, 4000)
    }
}
