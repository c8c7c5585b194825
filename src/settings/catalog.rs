//! Fixed catalog of selectable models.
//!
//! The catalog is compile-time data; it is not configurable at runtime.

// ---------------------------------------------------------------------------
// ModelDescriptor
// ---------------------------------------------------------------------------

/// One selectable entry in the model picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Identifier stored in `UserSettings::selected_model`.
    pub id: &'static str,
    /// Human-readable name shown in the picker.
    pub name: &'static str,
}

/// Every model the settings panel offers, in display order.
pub const MODEL_CATALOG: &[ModelDescriptor] = &[
    ModelDescriptor {
        id: "model-1",
        name: "Model A",
    },
    ModelDescriptor {
        id: "model-2",
        name: "Model B",
    },
    ModelDescriptor {
        id: "model-3",
        name: "Model C",
    },
];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look up a catalog entry by id.
///
/// ```
/// use voice_panel::settings::find_model;
///
/// assert_eq!(find_model("model-2").map(|m| m.name), Some("Model B"));
/// assert!(find_model("gpt-9").is_none());
/// ```
pub fn find_model(id: &str) -> Option<&'static ModelDescriptor> {
    MODEL_CATALOG.iter().find(|m| m.id == id)
}

/// Display name for `id`, or `None` for the empty selection and unknown ids.
pub fn display_name(id: &str) -> Option<&'static str> {
    find_model(id).map(|m| m.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        for (i, a) in MODEL_CATALOG.iter().enumerate() {
            for b in &MODEL_CATALOG[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn empty_selection_has_no_name() {
        assert_eq!(display_name(""), None);
    }

    #[test]
    fn every_entry_resolves_to_itself() {
        for m in MODEL_CATALOG {
            assert_eq!(find_model(m.id), Some(m));
        }
    }
}
