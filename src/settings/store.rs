//! Synchronisation between the in-memory settings record and storage.
//!
//! [`SettingsStore`] owns the record the panel edits.  Every mutation writes
//! the whole record back under [`SETTINGS_KEY`] before returning, so the
//! persisted blob and the in-memory record never disagree once a call has
//! completed.

use crate::storage::KeyValueStore;

use super::catalog;
use super::record::{SettingsError, UserSettings, SETTINGS_KEY};

/// In-memory settings record mirrored to a [`KeyValueStore`].
pub struct SettingsStore {
    storage: Box<dyn KeyValueStore>,
    settings: UserSettings,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // api_key stays out of logs.
        f.debug_struct("SettingsStore")
            .field("selected_model", &self.settings.selected_model)
            .field("model_options", &self.settings.model_options)
            .finish_non_exhaustive()
    }
}

impl SettingsStore {
    /// Hydrate from `storage` and write the hydrated record back.
    ///
    /// * No entry, or an empty entry: every field is `""`.
    /// * A valid entry: each field is adopted, missing ones become `""`.
    /// * A malformed entry: logged at `warn` and replaced by the empty
    ///   record.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Storage`] when the store cannot be read or written.
    pub fn load(storage: Box<dyn KeyValueStore>) -> Result<Self, SettingsError> {
        let settings = match storage.get(SETTINGS_KEY)? {
            Some(raw) if !raw.is_empty() => match UserSettings::from_json(&raw) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("settings: discarding persisted record ({e}); using defaults");
                    UserSettings::default()
                }
            },
            _ => UserSettings::default(),
        };

        log::debug!(
            "settings: hydrated (model = {:?}, api key set = {})",
            settings.selected_model,
            !settings.api_key.is_empty()
        );

        let mut store = Self { storage, settings };
        store.persist()?;
        Ok(store)
    }

    /// Current record.
    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    /// Display name of the selected model, `None` when nothing is selected.
    pub fn selected_model_name(&self) -> Option<&'static str> {
        catalog::display_name(&self.settings.selected_model)
    }

    /// Select a model.  Always clears `model_options`; options never carry
    /// over from one model to the next.
    pub fn select_model(&mut self, id: impl Into<String>) -> Result<(), SettingsError> {
        self.settings.selected_model = id.into();
        self.settings.model_options.clear();
        self.persist()
    }

    /// Replace the API key; other fields are untouched.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<(), SettingsError> {
        self.settings.api_key = api_key.into();
        self.persist()
    }

    /// Replace the model options text; other fields are untouched.
    pub fn set_model_options(&mut self, options: impl Into<String>) -> Result<(), SettingsError> {
        self.settings.model_options = options.into();
        self.persist()
    }

    fn persist(&mut self) -> Result<(), SettingsError> {
        let blob = self.settings.to_json()?;
        self.storage.set(SETTINGS_KEY, blob)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::storage::{FileStore, MemoryStore, StorageError};

    /// Store whose contents stay observable after it is boxed.
    #[derive(Clone, Default)]
    struct SharedStore {
        inner: Arc<Mutex<MemoryStore>>,
        fail_writes: bool,
    }

    impl SharedStore {
        fn with_blob(blob: &str) -> Self {
            Self {
                inner: Arc::new(Mutex::new(MemoryStore::with_entry(SETTINGS_KEY, blob))),
                fail_writes: false,
            }
        }

        fn blob(&self) -> Option<String> {
            self.inner.lock().unwrap().get(SETTINGS_KEY).unwrap()
        }

        fn persisted(&self) -> UserSettings {
            UserSettings::from_json(&self.blob().expect("blob written")).unwrap()
        }
    }

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.lock().unwrap().get(key)
        }

        fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "quota exceeded",
                )));
            }
            self.inner.lock().unwrap().set(key, value)
        }
    }

    // ---- hydration ---------------------------------------------------------

    #[test]
    fn no_blob_yields_empty_record() {
        let shared = SharedStore::default();
        let store = SettingsStore::load(Box::new(shared.clone())).unwrap();

        assert_eq!(store.settings(), &UserSettings::default());
        assert_eq!(store.selected_model_name(), None);
        assert_eq!(shared.persisted(), UserSettings::default());
    }

    #[test]
    fn full_blob_is_adopted() {
        let shared =
            SharedStore::with_blob(r#"{"selectedModel":"model-2","apiKey":"k1","modelOptions":"{}"}"#);
        let store = SettingsStore::load(Box::new(shared)).unwrap();

        assert_eq!(store.selected_model_name(), Some("Model B"));
        assert_eq!(store.settings().api_key, "k1");
        assert_eq!(store.settings().model_options, "{}");
    }

    #[test]
    fn api_key_only_blob_defaults_other_fields() {
        let shared = SharedStore::with_blob(r#"{"apiKey":"only"}"#);
        let store = SettingsStore::load(Box::new(shared)).unwrap();

        assert_eq!(store.settings().selected_model, "");
        assert_eq!(store.settings().model_options, "");
        assert_eq!(store.settings().api_key, "only");
    }

    #[test]
    fn empty_blob_is_treated_as_absent() {
        let shared = SharedStore::with_blob("");
        let store = SettingsStore::load(Box::new(shared)).unwrap();
        assert_eq!(store.settings(), &UserSettings::default());
    }

    #[test]
    fn malformed_blob_falls_back_to_defaults_and_is_overwritten() {
        let shared = SharedStore::with_blob("{\"apiKey\": ");
        let store = SettingsStore::load(Box::new(shared.clone())).unwrap();

        assert_eq!(store.settings(), &UserSettings::default());
        assert_eq!(shared.persisted(), UserSettings::default());
    }

    #[test]
    fn unknown_model_id_has_no_display_name() {
        let shared = SharedStore::with_blob(r#"{"selectedModel":"retired"}"#);
        let store = SettingsStore::load(Box::new(shared)).unwrap();
        assert_eq!(store.settings().selected_model, "retired");
        assert_eq!(store.selected_model_name(), None);
    }

    // ---- edits -------------------------------------------------------------

    #[test]
    fn persisted_blob_matches_memory_after_every_edit() {
        let shared = SharedStore::default();
        let mut store = SettingsStore::load(Box::new(shared.clone())).unwrap();

        store.select_model("model-1").unwrap();
        assert_eq!(&shared.persisted(), store.settings());

        store.set_api_key("sk-1").unwrap();
        assert_eq!(&shared.persisted(), store.settings());

        store.set_model_options(r#"{"temperature":0.2}"#).unwrap();
        assert_eq!(&shared.persisted(), store.settings());

        store.set_api_key("").unwrap();
        assert_eq!(&shared.persisted(), store.settings());

        store.select_model("model-3").unwrap();
        assert_eq!(&shared.persisted(), store.settings());
    }

    #[test]
    fn switching_model_resets_options() {
        let shared = SharedStore::with_blob(
            r#"{"selectedModel":"model-1","apiKey":"k","modelOptions":"{\"a\":1}"}"#,
        );
        let mut store = SettingsStore::load(Box::new(shared.clone())).unwrap();

        store.select_model("model-2").unwrap();

        assert_eq!(store.settings().selected_model, "model-2");
        assert_eq!(store.settings().model_options, "");
        assert_eq!(store.settings().api_key, "k");
        assert_eq!(shared.persisted().model_options, "");
    }

    #[test]
    fn api_key_edit_leaves_other_fields() {
        let shared = SharedStore::with_blob(
            r#"{"selectedModel":"model-3","apiKey":"old","modelOptions":"x"}"#,
        );
        let mut store = SettingsStore::load(Box::new(shared)).unwrap();

        store.set_api_key("new").unwrap();

        assert_eq!(store.settings().selected_model, "model-3");
        assert_eq!(store.settings().model_options, "x");
        assert_eq!(store.settings().api_key, "new");
    }

    #[test]
    fn options_edit_leaves_other_fields() {
        let shared = SharedStore::with_blob(
            r#"{"selectedModel":"model-3","apiKey":"k","modelOptions":""}"#,
        );
        let mut store = SettingsStore::load(Box::new(shared)).unwrap();

        store.set_model_options("not even json").unwrap();

        assert_eq!(store.settings().selected_model, "model-3");
        assert_eq!(store.settings().api_key, "k");
        assert_eq!(store.settings().model_options, "not even json");
    }

    #[test]
    fn write_failure_is_returned_and_memory_keeps_edit() {
        let shared = SharedStore::default();
        let mut store = SettingsStore::load(Box::new(shared.clone())).unwrap();

        let failing = SharedStore {
            inner: Arc::clone(&shared.inner),
            fail_writes: true,
        };
        store.storage = Box::new(failing);

        let err = store.set_api_key("k").unwrap_err();
        assert!(matches!(err, SettingsError::Storage(_)));
        assert_eq!(store.settings().api_key, "k");
        assert_eq!(shared.persisted().api_key, "");
    }

    #[test]
    fn file_store_survives_restart() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("storage.json");

        {
            let kv = FileStore::open(&path).unwrap();
            let mut store = SettingsStore::load(Box::new(kv)).unwrap();
            store.select_model("model-2").unwrap();
            store.set_api_key("k1").unwrap();
            store.set_model_options("{}").unwrap();
        }

        let kv = FileStore::open(&path).unwrap();
        let store = SettingsStore::load(Box::new(kv)).unwrap();
        assert_eq!(store.selected_model_name(), Some("Model B"));
        assert_eq!(store.settings().api_key, "k1");
        assert_eq!(store.settings().model_options, "{}");
    }
}
