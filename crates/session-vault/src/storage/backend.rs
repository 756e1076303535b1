//! The storage substrate abstraction.
//!
//! A backend is a flat string-keyed, string-valued map. The store only ever
//! uses the four primitives below; there is no iteration or range query.

use std::sync::Arc;

use crate::error::Result;

/// One storage scope's substrate.
///
/// Methods take `&self`; implementations own whatever interior mutability
/// they need.
pub trait StorageBackend {
    /// Read the raw value under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any existing entry.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Absent keys are not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Remove every entry.
    fn clear(&self) -> Result<()>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}
