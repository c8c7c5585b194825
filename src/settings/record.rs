//! The persisted settings record and its JSON form.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::storage::StorageError;

/// Storage key under which the record is persisted.
pub const SETTINGS_KEY: &str = "userSettings";

// ---------------------------------------------------------------------------
// SettingsError
// ---------------------------------------------------------------------------

/// Errors from loading or persisting the settings record.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The persisted blob is not a JSON object with string fields.
    #[error("persisted settings are malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The key-value store failed to read or write.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// ---------------------------------------------------------------------------
// UserSettings
// ---------------------------------------------------------------------------

/// The three-field settings record.
///
/// Serialises as `{"selectedModel": …, "apiKey": …, "modelOptions": …}`.
/// On the way in, a missing or `null` field becomes `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// Catalog id of the selected model, `""` when nothing is selected.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub selected_model: String,
    /// Opaque API key.  Stored in clear text.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub api_key: String,
    /// Free-form model options; conventionally JSON but never validated.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub model_options: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl UserSettings {
    /// Strict parse of a persisted blob.
    ///
    /// ```
    /// use voice_panel::settings::UserSettings;
    ///
    /// let s = UserSettings::from_json(r#"{"apiKey":"k1"}"#).unwrap();
    /// assert_eq!(s.api_key, "k1");
    /// assert_eq!(s.selected_model, "");
    /// assert!(UserSettings::from_json("not json").is_err());
    /// ```
    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Serialise the full record.
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_with_camel_case_keys() {
        let s = UserSettings {
            selected_model: "model-1".into(),
            api_key: "secret".into(),
            model_options: "{}".into(),
        };
        let value: serde_json::Value = serde_json::from_str(&s.to_json().unwrap()).unwrap();
        assert_eq!(value["selectedModel"], "model-1");
        assert_eq!(value["apiKey"], "secret");
        assert_eq!(value["modelOptions"], "{}");
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn only_api_key_defaults_the_rest() {
        let s = UserSettings::from_json(r#"{"apiKey":"abc"}"#).unwrap();
        assert_eq!(
            s,
            UserSettings {
                selected_model: String::new(),
                api_key: "abc".into(),
                model_options: String::new(),
            }
        );
    }

    #[test]
    fn null_fields_become_empty() {
        let s = UserSettings::from_json(
            r#"{"selectedModel":null,"apiKey":"k","modelOptions":null}"#,
        )
        .unwrap();
        assert_eq!(s.selected_model, "");
        assert_eq!(s.model_options, "");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let s = UserSettings::from_json(r#"{"apiKey":"k","theme":"dark"}"#).unwrap();
        assert_eq!(s.api_key, "k");
    }

    #[test]
    fn non_object_is_malformed() {
        assert!(matches!(
            UserSettings::from_json("null"),
            Err(SettingsError::Malformed(_))
        ));
        assert!(matches!(
            UserSettings::from_json("[1,2]"),
            Err(SettingsError::Malformed(_))
        ));
    }

    #[test]
    fn non_string_field_is_malformed() {
        assert!(UserSettings::from_json(r#"{"apiKey":42}"#).is_err());
    }
}
