//! The application session.

use log::{debug, error, info, warn};

use super::ControllerState;
use crate::catalog::{CatalogSource, Category, ToolCatalog, ToolDescriptor};
use crate::environment::EnvironmentRegistry;
use crate::error::{DevhubError, Result};
use crate::search::SearchIndex;
use crate::storage::{KEY_PREFIX, KeyValueStoreExt, SharedStore};
use crate::tools::{ToolFactory, ToolInput, ToolOutput, ToolWidget, Widget, WidgetContext};

/// Category id meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// A category together with how many catalog tools belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Everything one running devhub instance knows about.
///
/// Owns the catalog, the filters, the environment registry and the widget
/// currently open. All transitions go through [`ControllerState`] and a
/// rejected transition leaves the session untouched.
pub struct AppSession {
    state: ControllerState,
    store: SharedStore,
    catalog: ToolCatalog,
    load_error: Option<String>,
    index: SearchIndex,
    environments: EnvironmentRegistry,
    factory: ToolFactory,
    current: Option<Widget>,
    selected_category: String,
    search_text: String,
    active_environment: Option<String>,
}

impl AppSession {
    pub fn new(store: SharedStore, context: WidgetContext) -> Self {
        let environments = context.environments.clone();
        Self {
            state: ControllerState::Loading,
            store,
            catalog: ToolCatalog::new(),
            load_error: None,
            index: SearchIndex::default(),
            environments,
            factory: ToolFactory::new(context),
            current: None,
            selected_category: ALL_CATEGORIES.to_string(),
            search_text: String::new(),
            active_environment: None,
        }
    }

    /// Session over `store` with the default widget context.
    pub fn with_store(store: SharedStore) -> Self {
        let context = WidgetContext::new(store.clone());
        Self::new(store, context)
    }

    fn category_key() -> String {
        format!("{}selected_category", KEY_PREFIX)
    }

    fn transition(&mut self, target: ControllerState) -> Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(DevhubError::InvalidState(format!(
                "cannot go from {} to {}",
                self.state, target
            )));
        }
        debug!("Session {} -> {}", self.state, target);
        self.state = target;
        Ok(())
    }

    /// Load the catalog and restore the persisted category filter.
    ///
    /// A catalog that cannot be read leaves the session Ready with no tools;
    /// the failure is kept in [`AppSession::load_error`].
    pub fn load(&mut self, source: &CatalogSource) -> Result<()> {
        if self.state != ControllerState::Loading {
            return Err(DevhubError::InvalidState(format!("cannot load while {}", self.state)));
        }

        match ToolCatalog::load(source) {
            Ok(catalog) => {
                info!("Loaded {} tools", catalog.len());
                self.catalog = catalog;
                self.load_error = None;
            }
            Err(e) => {
                error!("Failed to load tool catalog: {}", e);
                self.catalog = ToolCatalog::new();
                self.load_error = Some(e.to_string());
            }
        }
        self.index.set_tools(self.catalog.tools().to_vec());
        self.selected_category = self.restore_category();
        self.refresh_environment_indicator();
        self.transition(ControllerState::Ready)
    }

    fn restore_category(&self) -> String {
        let saved = match self.store.load_json::<String>(&Self::category_key()) {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Ignoring unreadable category selection: {}", e);
                None
            }
        };
        match saved {
            Some(id) if id == ALL_CATEGORIES || self.catalog.category(&id).is_some() => id,
            Some(id) => {
                debug!("Saved category '{}' is not in the catalog", id);
                ALL_CATEGORIES.to_string()
            }
            None => ALL_CATEGORIES.to_string(),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn environments(&self) -> &EnvironmentRegistry {
        &self.environments
    }

    pub fn factory(&self) -> &ToolFactory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut ToolFactory {
        &mut self.factory
    }

    /// Open `tool_id` in a fresh widget.
    pub fn open_tool(&mut self, tool_id: &str) -> Result<()> {
        if !self.state.can_transition_to(ControllerState::ToolOpen) {
            return Err(DevhubError::InvalidState(format!(
                "cannot open {} while {}",
                tool_id, self.state
            )));
        }
        let descriptor = self.enabled_descriptor(tool_id)?.clone();

        let mut widget = self.factory.create(&descriptor);
        widget.on_open();
        info!("Opened tool {}", descriptor.id);
        self.current = Some(widget);
        self.transition(ControllerState::ToolOpen)
    }

    fn enabled_descriptor(&self, tool_id: &str) -> Result<&ToolDescriptor> {
        let descriptor = self
            .catalog
            .get(tool_id)
            .ok_or_else(|| DevhubError::ToolNotFound(tool_id.to_string()))?;
        if !descriptor.enabled {
            return Err(DevhubError::ToolDisabled(tool_id.to_string()));
        }
        Ok(descriptor)
    }

    /// Close the open widget, letting it release timers first.
    pub fn close_tool(&mut self) -> Result<()> {
        if self.state != ControllerState::ToolOpen {
            return Err(DevhubError::InvalidState(format!("no tool is open ({})", self.state)));
        }
        self.transition(ControllerState::Ready)?;
        if let Some(mut widget) = self.current.take() {
            widget.on_close();
            info!("Closed tool {}", widget.descriptor().id);
        }
        Ok(())
    }

    pub fn current_widget(&self) -> Option<&Widget> {
        self.current.as_ref()
    }

    pub fn current_widget_mut(&mut self) -> Option<&mut Widget> {
        self.current.as_mut()
    }

    /// Run an action on the open widget.
    pub fn run_current(&mut self, action: &str, input: &ToolInput) -> Result<ToolOutput> {
        let widget = self
            .current
            .as_mut()
            .ok_or_else(|| DevhubError::InvalidState("no tool is open".to_string()))?;
        Ok(widget.run(action, input))
    }

    pub fn open_environment_settings(&mut self) -> Result<()> {
        self.transition(ControllerState::EnvironmentSettingsOpen)
    }

    pub fn close_environment_settings(&mut self) -> Result<()> {
        if self.state != ControllerState::EnvironmentSettingsOpen {
            return Err(DevhubError::InvalidState(format!(
                "environment settings are not open ({})",
                self.state
            )));
        }
        self.transition(ControllerState::Ready)?;
        self.refresh_environment_indicator();
        Ok(())
    }

    /// Re-read the active environment name shown in the header.
    pub fn refresh_environment_indicator(&mut self) {
        self.active_environment = self.environments.get_active().map(|env| env.name);
    }

    pub fn active_environment_name(&self) -> Option<&str> {
        self.active_environment.as_deref()
    }

    /// Show only `category_id` (or everything for `all`), clearing the search.
    pub fn filter_by_category(&mut self, category_id: &str) {
        self.selected_category = category_id.to_string();
        self.search_text.clear();
        if let Err(e) = self.store.save_json(&Self::category_key(), category_id) {
            error!("Failed to persist category selection: {}", e);
        }
    }

    /// Narrow the visible tools by `query`. The category filter stays.
    pub fn search(&mut self, query: &str) {
        self.search_text = query.to_string();
    }

    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Tools matching both the search text and the category filter.
    pub fn visible_tools(&self) -> Vec<ToolDescriptor> {
        let mut tools = self.index.search(&self.search_text);
        if self.selected_category != ALL_CATEGORIES {
            tools.retain(|t| t.category == self.selected_category);
        }
        tools
    }

    /// Categories in display order; categories without tools are left out.
    pub fn categories_with_counts(&self) -> Vec<CategoryCount> {
        self.catalog
            .categories()
            .iter()
            .filter_map(|category| {
                let count = self.catalog.tools().iter().filter(|t| t.category == category.id).count();
                (count > 0).then(|| CategoryCount {
                    category: category.clone(),
                    count,
                })
            })
            .collect()
    }

    /// Open `tool_id`, run a single action on it and close it again.
    ///
    /// Only available from Ready; the session ends up Ready either way.
    pub fn run_tool(&mut self, tool_id: &str, action: &str, input: &ToolInput) -> Result<ToolOutput> {
        self.open_tool(tool_id)?;
        let output = self.run_current(action, input);
        self.close_tool()?;
        output
    }
}

impl Drop for AppSession {
    fn drop(&mut self) {
        if let Some(mut widget) = self.current.take() {
            widget.on_close();
        }
    }
}
