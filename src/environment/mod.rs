//! Named environments of template variables.
//!
//! An environment is a set of `name -> value` pairs. One environment can be
//! active at a time; its variables replace `{{name}}` placeholders in the
//! connection strings and destinations that tools accept.

mod registry;

pub use registry::EnvironmentRegistry;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Variable keys every new environment starts with.
const TEMPLATE_KEYS: &[(&str, &str)] = &[
    ("serviceBusConnectionString", ""),
    ("serviceBusQueueName", ""),
    ("serviceBusTopicName", ""),
    ("serviceBusSubscriptionName", ""),
    ("eventHubConnectionString", ""),
    ("eventHubName", ""),
    ("eventHubConsumerGroup", "$Default"),
    ("apiEndpoint", ""),
    ("apiKey", ""),
    ("bearerToken", ""),
    ("databaseConnectionString", ""),
    ("databaseName", ""),
    ("customVariable1", ""),
    ("customVariable2", ""),
    ("customVariable3", ""),
];

/// A named bag of template variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Assigned on first save when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub variables: BTreeMap<String, String>,
}

impl Environment {
    /// Create an unsaved environment with no variables.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create an unsaved environment pre-populated with the standard keys.
    pub fn default_template() -> Self {
        Self {
            variables: TEMPLATE_KEYS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    /// Builder-style variable setter.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The id, or an empty string for unsaved environments.
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    pub fn has_id(&self) -> bool {
        !self.id_str().is_empty()
    }

    /// Number of variables with a non-empty value.
    pub fn configured_count(&self) -> usize {
        self.variables.values().filter(|v| !v.is_empty()).count()
    }

    /// Replace every `{{key}}` in `text` with the matching variable.
    ///
    /// Keys are applied one after another in key order, so a value that
    /// itself contains a placeholder can be expanded by a later key.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (key, value) in &self.variables {
            let placeholder = format!("{{{{{}}}}}", key);
            if result.contains(&placeholder) {
                result = result.replace(&placeholder, value);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_keys() {
        let env = Environment::default_template();
        assert_eq!(env.variables.len(), 15);
        assert_eq!(env.variables.get("eventHubConsumerGroup").map(String::as_str), Some("$Default"));
        assert_eq!(env.variables.get("serviceBusConnectionString").map(String::as_str), Some(""));
        assert!(env.id.is_none());
    }

    #[test]
    fn test_configured_count() {
        let env = Environment::default_template().with_variable("apiKey", "secret");
        assert_eq!(env.configured_count(), 2);
    }

    #[test]
    fn test_apply_replaces_all_occurrences() {
        let env = Environment::new("dev").with_variable("host", "localhost");
        assert_eq!(env.apply("{{host}}:{{host}}"), "localhost:localhost");
    }

    #[test]
    fn test_apply_is_case_sensitive() {
        let env = Environment::new("dev").with_variable("host", "localhost");
        assert_eq!(env.apply("{{HOST}}"), "{{HOST}}");
    }

    #[test]
    fn test_apply_leaves_unknown_placeholders() {
        let env = Environment::new("dev").with_variable("a", "1");
        assert_eq!(env.apply("{{a}}-{{b}}"), "1-{{b}}");
    }

    #[test]
    fn test_apply_empty_value() {
        let env = Environment::new("dev").with_variable("a", "");
        assert_eq!(env.apply("x{{a}}y"), "xy");
    }

    #[test]
    fn test_apply_regex_chars_are_literal() {
        let env = Environment::new("dev")
            .with_variable("a.b", "dot")
            .with_variable("cost", "$1");
        assert_eq!(env.apply("{{a.b}} {{axb}} {{cost}}"), "dot {{axb}} $1");
    }

    #[test]
    fn test_apply_nested_value_expands_later_key() {
        // "a" sorts before "b", so a's value is expanded by b in the same pass
        let env = Environment::new("dev")
            .with_variable("a", "{{b}}")
            .with_variable("b", "final");
        assert_eq!(env.apply("{{a}}"), "final");
    }

    #[test]
    fn test_serde_shape() {
        let env = Environment::new("dev").with_variable("k", "v");
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, r#"{"name":"dev","description":"","variables":{"k":"v"}}"#);

        let parsed: Environment = serde_json::from_str(r#"{"id":"env_1","name":"x"}"#).unwrap();
        assert_eq!(parsed.id.as_deref(), Some("env_1"));
        assert!(parsed.variables.is_empty());
    }
}
