//! In-memory key-value store, used for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::RwLock;

use super::traits::KeyValueStore;
use crate::error::{DevhubError, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().map_err(|e| DevhubError::Storage(e.to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().map_err(|e| DevhubError::Storage(e.to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().map_err(|e| DevhubError::Storage(e.to_string()))?;
        items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let items = self.items.read().map_err(|e| DevhubError::Storage(e.to_string()))?;
        let mut keys: Vec<String> = items.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Store whose every operation fails, for exercising degraded paths.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingStore;

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(DevhubError::Storage("store unavailable".to_string()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Err(DevhubError::Storage("store unavailable".to_string()))
    }

    fn remove_item(&self, _key: &str) -> Result<()> {
        Err(DevhubError::Storage("store unavailable".to_string()))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Err(DevhubError::Storage("store unavailable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let store = MemoryStore::new();
        store.set_item("a", "1").unwrap();
        assert_eq!(store.get_item("a").unwrap(), Some("1".to_string()));
        store.remove_item("a").unwrap();
        assert_eq!(store.get_item("a").unwrap(), None);
    }

    #[test]
    fn test_keys() {
        let store = MemoryStore::new();
        store.set_item("z", "1").unwrap();
        store.set_item("m", "1").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["m", "z"]);
    }
}
