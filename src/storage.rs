//! Durable key-value storage.
//!
//! The browser's `localStorage` is the only persistence the site has. It is
//! modelled as [`KeyValueStore`] so the search history and the analytics
//! tracker can run against [`MemoryStore`] in tests; the `web` module provides
//! the real implementation.
//!
//! Values are JSON strings. [`load_json`] never fails: a missing key yields the
//! default and a corrupt payload is logged and replaced by the default.

use crate::error::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::warn;

/// String-keyed, string-valued persistent store.
///
/// Methods take `&self`: the browser store is shared global state and the
/// page is single-threaded, so implementations use interior mutability.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

/// In-memory store. Nothing survives the process.
///
/// `fail_writes` simulates an exhausted quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail with [`StorageError::Write`].
    pub fn read_only() -> Self {
        MemoryStore {
            items: RefCell::default(),
            fail_writes: true,
        }
    }

    /// Seed a raw value, bypassing `fail_writes`.
    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Write(key.to_string()));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read and decode `key`, falling back to `T::default()` on any failure.
pub fn load_json<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored data");
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "Discarding corrupt stored data");
            T::default()
        }
    }
}

/// Encode `value` and write it under `key`.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set_item(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_key_is_default() {
        let store = MemoryStore::new();
        let value: Vec<String> = load_json(&store, "missing");
        assert!(value.is_empty());
    }

    #[test]
    fn test_load_corrupt_payload_is_default() {
        let store = MemoryStore::new().with_item("history", "not json [");
        let value: Vec<String> = load_json(&store, "history");
        assert!(value.is_empty());
    }

    #[test]
    fn test_load_wrong_shape_is_default() {
        let store = MemoryStore::new().with_item("history", r#"{"a": 1}"#);
        let value: Vec<String> = load_json(&store, "history");
        assert!(value.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        save_json(&store, "history", &vec!["rust", "wasm"]).unwrap();
        assert_eq!(store.raw("history").unwrap(), r#"["rust","wasm"]"#);

        let value: Vec<String> = load_json(&store, "history");
        assert_eq!(value, vec!["rust", "wasm"]);
    }

    #[test]
    fn test_read_only_store_rejects_writes() {
        let store = MemoryStore::read_only();
        assert_eq!(
            save_json(&store, "k", &1),
            Err(StorageError::Write("k".to_string()))
        );
        assert_eq!(store.raw("k"), None);
    }

    #[test]
    fn test_shared_store_through_rc() {
        let store = Rc::new(MemoryStore::new());
        let handle = Rc::clone(&store);
        save_json(&handle, "k", &42).unwrap();
        assert_eq!(store.raw("k").as_deref(), Some("42"));
    }
}
