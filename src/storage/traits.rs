//! Key-value store trait and JSON helpers.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;

/// A persistent string-keyed store holding string values.
///
/// Mirrors the contract of a browser's local storage: values are opaque
/// strings, callers serialize JSON themselves via [`KeyValueStoreExt`].
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// List all keys currently stored.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Store handle shared between the session, the registry and widgets.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// JSON convenience methods available on every store.
pub trait KeyValueStoreExt: KeyValueStore {
    /// Read and deserialize the value under `key`.
    ///
    /// A missing key is `Ok(None)`; a corrupt value is an error.
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_item(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` and store it under `key`.
    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_save_and_load_json() {
        let store = MemoryStore::new();
        let sample = Sample {
            name: "alpha".to_string(),
            count: 3,
        };
        store.save_json("sample", &sample).unwrap();
        let loaded: Option<Sample> = store.load_json("sample").unwrap();
        assert_eq!(loaded, Some(sample));
    }

    #[test]
    fn test_load_json_missing_key() {
        let store = MemoryStore::new();
        let loaded: Option<Sample> = store.load_json("missing").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_json_corrupt_value() {
        let store = MemoryStore::new();
        store.set_item("sample", "{not json").unwrap();
        let loaded: Result<Option<Sample>> = store.load_json("sample");
        assert!(loaded.is_err());
    }

    #[test]
    fn test_ext_methods_on_shared_store() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.save_json("list", &vec![1, 2, 3]).unwrap();
        let loaded: Option<Vec<u32>> = store.load_json("list").unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }
}
