//! String-keyed persistent storage.
//!
//! [`KeyValueStore`] is the narrow capability the settings panel needs:
//! `get(key)` and `set(key, value)`, both on plain strings.  Two
//! implementations are provided:
//!
//! * [`FileStore`]: a JSON object on disk, one entry per key.
//! * [`MemoryStore`]: a `HashMap`, used by tests and as the fallback when
//!   the on-disk store cannot be opened.
//!
//! There is no locking.  Two processes writing the same file race and the
//! last write wins.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

/// Errors raised by a [`KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The in-memory map could not be serialized.
    #[error("storage file is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// KeyValueStore
// ---------------------------------------------------------------------------

/// Minimal string key-value persistence.
///
/// `set` replaces the whole value stored under `key`; there is no merge.
pub trait KeyValueStore: Send {
    /// Value stored under `key`, or `None` when the key was never set.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, overwriting any previous value.
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
}

// Compile-time assertion: Box<dyn KeyValueStore> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn KeyValueStore>) {}
};
