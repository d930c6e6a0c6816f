use std::path::{Path, PathBuf};
use crate::error::SynaptiqError;
use super::KeyValueStore;

/// One `<key>.json` file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        FileStore { dir: dir.into() }
    }

    /// Store rooted at the configured data directory
    pub fn from_config() -> Self {
        Self::new(crate::config::get_config().data_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, SynaptiqError> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(SynaptiqError::new(
                format!("Invalid store key '{}'", key),
                "store"
            ));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SynaptiqError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SynaptiqError::new(
                format!("Failed to read {}: {}", key, e),
                "io"
            ).with_context(format!("path: {:?}", path))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SynaptiqError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| SynaptiqError::new(
                format!("Failed to create directory: {}", e),
                "io"
            ).with_context(format!("path: {:?}", self.dir)))?;

        // Write to a sibling temp file first so a crash never leaves half a value
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .and_then(|_| std::fs::rename(&tmp, &path))
            .map_err(|e| SynaptiqError::new(
                format!("Failed to write {}: {}", key, e),
                "io"
            ).with_context(format!("path: {:?}", path)))?;

        tracing::debug!(key = key, bytes = value.len(), "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SynaptiqError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SynaptiqError::new(
                format!("Failed to remove {}: {}", key, e),
                "io"
            ).with_context(format!("path: {:?}", path))),
        }
    }
}
