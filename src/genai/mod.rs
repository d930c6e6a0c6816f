//! Structured text generation: a model-agnostic query loop with caching,
//! retries and a circuit breaker, the Gemini client, and the two flows built on it.

pub mod flows;
pub mod gemini;
pub mod json;

use std::future::Future;
use std::time::Instant;
use serde::de::DeserializeOwned;
use crate::circuit_breaker::ExponentialBackoff;
use crate::config::AppConfig;
use crate::error::SynaptiqError;
use crate::logging::log_model_call;
use crate::state::AppState;

pub use gemini::{GeminiClient, KeyRing};

/// Anything that turns a prompt into raw text.
pub trait TextGenerator: Send + Sync {
    fn model(&self) -> &str;

    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, SynaptiqError>> + Send;
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    pub backoff: ExponentialBackoff,
}

impl RetryPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        RetryPolicy {
            max_retries: config.max_retries,
            backoff: ExponentialBackoff::default(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 2,
            backoff: ExponentialBackoff::default(),
        }
    }
}

/// Pull the JSON document out of model text and deserialize it.
pub fn parse_output<T: DeserializeOwned>(text: &str) -> Result<T, SynaptiqError> {
    let json = json::extract_json(text)
        .map_err(|e| SynaptiqError::new(e.to_string(), "json_extract"))?;
    serde_json::from_str(&json).map_err(|e| {
        SynaptiqError::new(format!("Model output did not match the expected shape: {}", e), "json_parse")
    })
}

/// Cached, retried, breaker-guarded structured query.
pub async fn query<T, G>(
    state: &AppState,
    generator: &G,
    prompt: &str,
    policy: RetryPolicy,
) -> Result<T, SynaptiqError>
where
    T: DeserializeOwned,
    G: TextGenerator + ?Sized,
{
    let model = generator.model();

    if let Some(text) = state.response_cache.get(model, prompt) {
        match parse_output::<T>(&text) {
            Ok(parsed) => {
                state.metrics.record_cache_hit();
                return Ok(parsed);
            }
            Err(e) => tracing::warn!(model = model, error = %e, "Failed to parse cached response"),
        }
    }
    state.metrics.record_cache_miss();

    if !state.breaker.allow_request() {
        state.metrics.record_error();
        return Err(SynaptiqError::new(
            "Generation service is temporarily unavailable",
            "circuit_breaker",
        )
        .with_model(model));
    }

    let mut last_error = None;
    for attempt in 0..=policy.max_retries {
        let start = Instant::now();
        let outcome = match generator.generate(prompt).await {
            Ok(text) => parse_output::<T>(&text).map(|parsed| (text, parsed)),
            Err(e) => Err(e),
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok((text, parsed)) => {
                state.breaker.record_success();
                state.metrics.record_model_call(latency_ms);
                log_model_call(model, "query", true, latency_ms);
                if attempt > 0 {
                    tracing::info!(model = model, attempt = attempt, "Model call succeeded after retry");
                }
                state.response_cache.put(model, prompt, &text);
                return Ok(parsed);
            }
            Err(e) => {
                state.breaker.record_failure();
                state.metrics.record_model_failure();
                log_model_call(model, "query", false, latency_ms);

                if attempt < policy.max_retries && state.breaker.allow_request() {
                    let delay = policy.backoff.jittered(attempt, &mut rand::thread_rng());
                    tracing::warn!(
                        model = model,
                        error = %e,
                        attempt = attempt + 1,
                        max_attempts = policy.max_retries + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Model call failed, retrying with backoff"
                    );
                    last_error = Some(e);
                    tokio::time::sleep(delay).await;
                } else {
                    last_error = Some(e);
                    break;
                }
            }
        }
    }

    state.metrics.record_error();
    let cause = last_error
        .map(|e| e.message)
        .unwrap_or_else(|| "no attempts made".to_string());
    tracing::error!(model = model, error = %cause, "Model call failed after all retries");
    Err(SynaptiqError::new(format!("Model call failed: {}", cause), "model_call")
        .with_model(model)
        .with_retry(false))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use parking_lot::Mutex;

    /// Replays canned replies in order, repeating the last one.
    pub struct ScriptedGenerator {
        replies: Vec<Result<String, SynaptiqError>>,
        pub calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(replies: Vec<Result<String, SynaptiqError>>) -> Self {
            ScriptedGenerator { replies, calls: AtomicUsize::new(0), prompts: Mutex::new(Vec::new()) }
        }

        pub fn ok(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String, SynaptiqError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().push(prompt.to_string());
            let reply = &self.replies[n.min(self.replies.len() - 1)];
            reply.clone()
        }
    }

    pub fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy { max_retries, backoff: ExponentialBackoff::new(1, 1) }
    }
}
