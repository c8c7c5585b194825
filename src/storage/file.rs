//! JSON-file [`KeyValueStore`].
//!
//! The file holds a single JSON object whose values are all strings:
//!
//! ```text
//! { "userSettings": "{\"selectedModel\":\"model-2\",...}" }
//! ```
//!
//! The whole map is kept in memory and the file is rewritten on every `set`
//! through a sibling temp file and a rename, so a crash mid-write leaves the
//! previous contents intact.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{KeyValueStore, StorageError};

/// Key-value store persisted as a JSON object on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store; the file is only created by the
    /// first [`KeyValueStore::set`].  A file that is not a JSON object of
    /// strings is logged and treated as empty; the next `set` replaces it.
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] when the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!(
                        "storage: {} is malformed ({e}); starting empty",
                        path.display()
                    );
                    BTreeMap::new()
                })
            }
        } else {
            BTreeMap::new()
        };

        log::debug!(
            "storage: opened {} ({} keys)",
            path.display(),
            entries.len()
        );

        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value);
        self.flush()
    }
}
