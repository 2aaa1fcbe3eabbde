//! Persistent registry of environments and the active-environment pointer.

use std::collections::BTreeMap;

use log::{debug, error, info};

use super::Environment;
use crate::id::generate_env_id;
use crate::storage::{KEY_PREFIX, KeyValueStoreExt, SharedStore};

/// CRUD over environments stored as a single JSON list.
///
/// Storage failures never reach the caller: they are logged and the
/// operation reports an empty result or `false`.
#[derive(Clone)]
pub struct EnvironmentRegistry {
    store: SharedStore,
}

impl EnvironmentRegistry {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    fn environments_key() -> String {
        format!("{}environments", KEY_PREFIX)
    }

    fn active_key() -> String {
        format!("{}active_environment", KEY_PREFIX)
    }

    /// All environments in stored order.
    pub fn list_all(&self) -> Vec<Environment> {
        match self.store.load_json::<Vec<Environment>>(&Self::environments_key()) {
            Ok(envs) => envs.unwrap_or_default(),
            Err(e) => {
                error!("Failed to load environments: {}", e);
                Vec::new()
            }
        }
    }

    /// Look up an environment by id.
    pub fn get(&self, id: &str) -> Option<Environment> {
        self.list_all().into_iter().find(|env| env.id_str() == id)
    }

    /// Id stored in the active pointer, whether or not it still resolves.
    pub fn active_id(&self) -> Option<String> {
        match self.store.load_json::<String>(&Self::active_key()) {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(e) => {
                error!("Failed to load active environment: {}", e);
                None
            }
        }
    }

    /// The active environment, or `None` when unset or dangling.
    pub fn get_active(&self) -> Option<Environment> {
        let id = self.active_id()?;
        let env = self.get(&id);
        if env.is_none() {
            debug!("Active environment {} no longer exists", id);
        }
        env
    }

    /// Point the active pointer at `id`. The id is not validated.
    pub fn set_active(&self, id: &str) -> bool {
        match self.store.save_json(&Self::active_key(), id) {
            Ok(()) => {
                info!("Active environment set to {}", id);
                true
            }
            Err(e) => {
                error!("Failed to set active environment: {}", e);
                false
            }
        }
    }

    /// Insert or replace an environment, assigning an id when it has none.
    ///
    /// Returns the environment as saved.
    pub fn save(&self, mut env: Environment) -> Option<Environment> {
        let mut envs = self.list_all();

        if !env.has_id() {
            env.id = Some(generate_env_id());
        }

        match envs.iter_mut().find(|e| e.id == env.id) {
            Some(existing) => *existing = env.clone(),
            None => envs.push(env.clone()),
        }

        match self.store.save_json(&Self::environments_key(), &envs) {
            Ok(()) => {
                debug!("Saved environment {} ({})", env.name, env.id_str());
                Some(env)
            }
            Err(e) => {
                error!("Failed to save environment: {}", e);
                None
            }
        }
    }

    /// Remove an environment, clearing the active pointer if it pointed here.
    pub fn delete(&self, id: &str) -> bool {
        let mut envs = self.list_all();
        envs.retain(|env| env.id_str() != id);

        if let Err(e) = self.store.save_json(&Self::environments_key(), &envs) {
            error!("Failed to delete environment: {}", e);
            return false;
        }

        if self.active_id().as_deref() == Some(id)
            && let Err(e) = self.store.remove_item(&Self::active_key())
        {
            error!("Failed to clear active environment: {}", e);
            return false;
        }

        info!("Deleted environment {}", id);
        true
    }

    /// Variables of the active environment, empty when none is active.
    pub fn variables(&self) -> BTreeMap<String, String> {
        self.get_active().map(|env| env.variables).unwrap_or_default()
    }

    /// A single variable of the active environment, empty when absent.
    pub fn get_variable(&self, key: &str) -> String {
        self.variables().remove(key).unwrap_or_default()
    }

    /// Add or update one variable on a stored environment.
    pub fn add_variable(&self, env_id: &str, key: &str, value: &str) -> bool {
        match self.get(env_id) {
            Some(mut env) => {
                env.variables.insert(key.to_string(), value.to_string());
                self.save(env).is_some()
            }
            None => false,
        }
    }

    /// Replace `{{name}}` placeholders using the active environment.
    ///
    /// Text is returned unchanged when no environment is active.
    pub fn substitute(&self, text: &str) -> String {
        match self.get_active() {
            Some(env) => env.apply(text),
            None => text.to_string(),
        }
    }
}
