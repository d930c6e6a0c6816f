use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;
use chrono::{Duration, Utc};
use lru::LruCache;
use parking_lot::RwLock;

const DEFAULT_CAPACITY: usize = 100;

#[derive(Clone, Debug)]
pub struct CachedResponse {
    pub text: String,
    pub timestamp: i64,
}

/// Generate a hash key from model name and prompt
fn cache_key(model: &str, prompt: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    model.hash(&mut hasher);
    prompt.hash(&mut hasher);
    hasher.finish()
}

fn preview(prompt: &str) -> String {
    prompt.chars().take(50).collect()
}

/// Bounded cache of raw model output, keyed on model + prompt.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<RwLock<LruCache<u64, CachedResponse>>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        ResponseCache {
            entries: Arc::new(RwLock::new(LruCache::new(capacity))),
            ttl,
        }
    }

    pub fn get(&self, model: &str, prompt: &str) -> Option<String> {
        let key = cache_key(model, prompt);
        let mut entries = self.entries.write();

        let fresh = match entries.get(&key) {
            Some(cached) => Utc::now().timestamp() - cached.timestamp <= self.ttl.num_seconds(),
            None => {
                tracing::debug!(model = model, prompt_preview = %preview(prompt), "Cache miss");
                return None;
            }
        };
        if !fresh {
            entries.pop(&key);
            tracing::debug!(model = model, "Cached response expired");
            return None;
        }

        tracing::debug!(model = model, prompt_preview = %preview(prompt), "Cache hit");
        entries.get(&key).map(|cached| cached.text.clone())
    }

    pub fn put(&self, model: &str, prompt: &str, text: &str) {
        let cached = CachedResponse {
            text: text.to_string(),
            timestamp: Utc::now().timestamp(),
        };
        self.entries.write().put(cache_key(model, prompt), cached);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, Duration::hours(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_requires_same_model_and_prompt() {
        let cache = ResponseCache::default();
        cache.put("gemini", "tips please", "{}");
        assert_eq!(cache.get("gemini", "tips please").as_deref(), Some("{}"));
        assert!(cache.get("other", "tips please").is_none());
        assert!(cache.get("gemini", "careers please").is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = ResponseCache::new(2, Duration::hours(1));
        cache.put("m", "a", "1");
        cache.put("m", "b", "2");
        cache.put("m", "c", "3");
        assert_eq!(cache.len(), 2);
        assert!(cache.get("m", "a").is_none());
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = ResponseCache::new(4, Duration::seconds(-1));
        cache.put("m", "a", "1");
        assert!(cache.get("m", "a").is_none());
        assert!(cache.is_empty());
    }
}
