//! Connection form shared by the simulated queue sender and listener.
//!
//! The form fields arrive as input options (`label`, `connectionString`,
//! `queueName`). Fields left empty fall back to the tool's saved
//! configuration, the way the form opens pre-filled.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ToolInput, ToolOutput};
use crate::environment::EnvironmentRegistry;
use crate::storage::{ToolConfig, ToolConfigStore};

/// What a simulated send would have put on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRecord {
    pub queue_name: String,
    pub message_id: String,
    pub body: String,
    pub properties: Value,
    pub timestamp: String,
    pub status: String,
}

/// Saved configuration, history and environment lookups for one tool.
#[derive(Clone)]
pub struct MessagingForm {
    tool_id: String,
    configs: ToolConfigStore,
    environments: EnvironmentRegistry,
}

impl MessagingForm {
    pub fn new(tool_id: impl Into<String>, configs: ToolConfigStore, environments: EnvironmentRegistry) -> Self {
        Self {
            tool_id: tool_id.into(),
            configs,
            environments,
        }
    }

    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    pub fn environments(&self) -> &EnvironmentRegistry {
        &self.environments
    }

    /// Last saved configuration.
    pub fn saved(&self) -> Option<ToolConfig> {
        self.configs.load_config(&self.tool_id)
    }

    /// Form values from the input, trimmed, before substitution.
    pub fn fields(&self, input: &ToolInput) -> ToolConfig {
        let saved = self.saved().unwrap_or_default();
        let pick = |key: &str, fallback: String| {
            let value = input.option_trimmed(key);
            if value.is_empty() { fallback } else { value.to_string() }
        };
        ToolConfig {
            label: pick("label", saved.label),
            connection_string: pick("connectionString", saved.connection_string),
            queue_name: pick("queueName", saved.queue_name),
        }
    }

    /// Connection string and destination with `{{var}}` placeholders resolved.
    pub fn resolve(&self, input: &ToolInput) -> (String, String) {
        let fields = self.fields(input);
        (
            self.environments.substitute(&fields.connection_string),
            self.environments.substitute(&fields.queue_name),
        )
    }

    pub fn save_config(&self, input: &ToolInput) -> ToolOutput {
        let config = self.fields(input);
        if config.connection_string.is_empty() || config.queue_name.is_empty() {
            return ToolOutput::error("Please provide connection string and queue/topic name");
        }

        let saved = self.configs.save_config(&self.tool_id, &config);
        let recorded = self.configs.save_to_history(&self.tool_id, &config);
        if saved && recorded {
            ToolOutput::success("✓ Configuration saved successfully!")
        } else {
            ToolOutput::error("Failed to save configuration")
        }
    }

    pub fn clear_config(&self) -> ToolOutput {
        if self.configs.clear_config(&self.tool_id) {
            ToolOutput::success("Configuration cleared")
        } else {
            ToolOutput::error("Failed to clear configuration")
        }
    }

    pub fn load_history(&self) -> ToolOutput {
        let history = self.configs.load_history(&self.tool_id);
        if history.is_empty() {
            return ToolOutput::success("No saved configurations");
        }
        let lines: Vec<String> = history
            .iter()
            .enumerate()
            .map(|(i, h)| format!("[{}] {} - {} ({})", i, h.label, h.queue_name, h.timestamp))
            .collect();
        ToolOutput::success(lines.join("\n"))
    }

    /// Pick a history entry by index and return it as form values.
    pub fn use_history(&self, input: &ToolInput) -> ToolOutput {
        let raw = input.option("index").unwrap_or(input.text.as_str());
        let Ok(index) = raw.trim().parse::<usize>() else {
            return ToolOutput::error("Please provide a history index");
        };
        match self.configs.load_history(&self.tool_id).get(index) {
            Some(entry) => match serde_json::to_string_pretty(&entry.to_config()) {
                Ok(json) => ToolOutput::success(json),
                Err(e) => ToolOutput::error(format!("Error: {}", e)),
            },
            None => ToolOutput::error(format!("No history entry at index {}", index)),
        }
    }

    /// Handle the configuration actions both messaging tools share.
    pub fn run(&self, action: &str, input: &ToolInput) -> Option<ToolOutput> {
        match action {
            "save-config" => Some(self.save_config(input)),
            "clear-config" => Some(self.clear_config()),
            "load-history" => Some(self.load_history()),
            "use-history" => Some(self.use_history(input)),
            _ => None,
        }
    }
}

pub(crate) fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
