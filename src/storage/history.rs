//! Per-tool saved configuration and bounded configuration history.
//!
//! Messaging widgets remember the last saved connection form and a short
//! history of previous ones. History is newest first, capped, and keeps a
//! single entry per connection string.

use chrono::{SecondsFormat, Utc};
use log::error;
use serde::{Deserialize, Serialize};

use super::traits::{KeyValueStoreExt, SharedStore};

/// Key prefix shared by every persisted devhub value.
pub const KEY_PREFIX: &str = "devtools_";

/// Default number of history entries kept per tool.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Saved connection form of a messaging tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolConfig {
    pub label: String,
    pub connection_string: String,
    pub queue_name: String,
}

impl ToolConfig {
    pub fn new(
        label: impl Into<String>,
        connection_string: impl Into<String>,
        queue_name: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            connection_string: connection_string.into(),
            queue_name: queue_name.into(),
        }
    }
}

/// One remembered configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigHistoryEntry {
    pub label: String,
    pub connection_string: String,
    pub queue_name: String,
    /// RFC 3339 UTC timestamp of when the entry was recorded
    pub timestamp: String,
}

impl ConfigHistoryEntry {
    /// The form values of this entry.
    pub fn to_config(&self) -> ToolConfig {
        ToolConfig {
            label: self.label.clone(),
            connection_string: self.connection_string.clone(),
            queue_name: self.queue_name.clone(),
        }
    }
}

/// Saved configs and history for every tool, on top of a key-value store.
///
/// Every operation swallows storage failures: they are logged and reported
/// as `false`/`None`/empty.
#[derive(Clone)]
pub struct ToolConfigStore {
    store: SharedStore,
    capacity: usize,
}

impl ToolConfigStore {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    /// Set the number of history entries kept per tool.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn config_key(tool_id: &str) -> String {
        format!("{}{}", KEY_PREFIX, tool_id)
    }

    fn history_key(tool_id: &str) -> String {
        format!("{}{}_history", KEY_PREFIX, tool_id)
    }

    /// Save the current configuration for a tool.
    pub fn save_config(&self, tool_id: &str, config: &ToolConfig) -> bool {
        match self.store.save_json(&Self::config_key(tool_id), config) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save config for {}: {}", tool_id, e);
                false
            }
        }
    }

    /// Load the saved configuration for a tool.
    pub fn load_config(&self, tool_id: &str) -> Option<ToolConfig> {
        match self.store.load_json(&Self::config_key(tool_id)) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load config for {}: {}", tool_id, e);
                None
            }
        }
    }

    /// Record a configuration at the head of the tool's history.
    ///
    /// An empty label becomes `Config N`, N counted from the history length
    /// before insertion. Entries with the same connection string are replaced.
    pub fn save_to_history(&self, tool_id: &str, config: &ToolConfig) -> bool {
        let mut history = self.load_history(tool_id);

        let label = if config.label.is_empty() {
            format!("Config {}", history.len() + 1)
        } else {
            config.label.clone()
        };

        let entry = ConfigHistoryEntry {
            label,
            connection_string: config.connection_string.clone(),
            queue_name: config.queue_name.clone(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        history.retain(|h| h.connection_string != config.connection_string);
        history.insert(0, entry);
        history.truncate(self.capacity);

        match self.store.save_json(&Self::history_key(tool_id), &history) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save history for {}: {}", tool_id, e);
                false
            }
        }
    }

    /// Load the tool's history, newest first.
    pub fn load_history(&self, tool_id: &str) -> Vec<ConfigHistoryEntry> {
        match self.store.load_json(&Self::history_key(tool_id)) {
            Ok(history) => history.unwrap_or_default(),
            Err(e) => {
                error!("Failed to load history for {}: {}", tool_id, e);
                Vec::new()
            }
        }
    }

    /// Forget the saved configuration for a tool.
    pub fn clear_config(&self, tool_id: &str) -> bool {
        match self.store.remove_item(&Self::config_key(tool_id)) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to clear config for {}: {}", tool_id, e);
                false
            }
        }
    }

    /// Forget the history for a tool.
    pub fn clear_history(&self, tool_id: &str) -> bool {
        match self.store.remove_item(&Self::history_key(tool_id)) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to clear history for {}: {}", tool_id, e);
                false
            }
        }
    }
}
