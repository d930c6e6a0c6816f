//! Key-value persistence port. Values are opaque strings (JSON in practice).

pub mod file;
pub mod memory;

use crate::error::SynaptiqError;

pub use file::FileStore;
pub use memory::MemoryStore;

pub const SUBJECTS_KEY: &str = "app_subjects";
pub const TASKS_KEY: &str = "app_tasks";
pub const STUDY_LOGS_KEY: &str = "app_studyLogs";
pub const SLEEP_LOGS_KEY: &str = "app_sleepLogs";
pub const EXAMS_KEY: &str = "app_exams";
pub const STUDY_PLAN_KEY: &str = "studyPlan";
pub const HABITS_KEY: &str = "trackedHabits";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SynaptiqError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SynaptiqError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), SynaptiqError>;
}

/// Load and decode a JSON value. Unparsable data is logged and treated as absent.
pub fn load_json<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, SynaptiqError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key = key, error = %e, "Failed to parse stored value, ignoring it");
            Ok(None)
        }
    }
}

pub fn save_json<T: serde::Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), SynaptiqError> {
    let json = serde_json::to_string(value)
        .map_err(|e| SynaptiqError::new(
            format!("Failed to serialize value: {}", e),
            "json_serialize"
        ).with_context(format!("key: {}", key)))?;
    store.set(key, &json)
}
