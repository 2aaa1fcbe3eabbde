//! TUI Application
//!
//! Turns key presses into session operations and keeps the UI state in step.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info};

use super::state::{Focus, Prompt, PromptKind, ToolPane, UiState};
use crate::catalog::CatalogSource;
use crate::controller::{ALL_CATEGORIES, AppSession, ControllerState};
use crate::environment::Environment;
use crate::error::DevhubError;
use crate::tools::{InputFile, ToolInput, ToolWidget};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Tick rate in milliseconds
    pub tick_rate_ms: u64,
    /// Where exported files are written
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            export_dir: PathBuf::from("."),
        }
    }
}

/// Main TUI application
pub struct App {
    pub session: AppSession,
    pub ui: UiState,
    pub config: AppConfig,
}

impl App {
    pub fn new(session: AppSession, config: AppConfig) -> Self {
        Self {
            session,
            ui: UiState::default(),
            config,
        }
    }

    /// Load the catalog, reporting a failed load on the status line.
    pub fn load(&mut self, source: &CatalogSource) -> crate::error::Result<()> {
        self.session.load(source)?;
        if let Some(err) = self.session.load_error() {
            self.ui.set_error(format!("Failed to load tools: {}", err));
        }
        Ok(())
    }

    /// Handle one key press. Returns `true` when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return true;
        }

        match self.session.state() {
            ControllerState::Loading => {}
            ControllerState::Ready => self.handle_home_key(key),
            ControllerState::ToolOpen => self.handle_tool_key(key),
            ControllerState::EnvironmentSettingsOpen => self.handle_env_key(key),
        }
        self.ui.should_quit
    }

    pub fn quit(&mut self) {
        self.ui.should_quit = true;
    }

    // Home screen

    fn handle_home_key(&mut self, key: KeyEvent) {
        if self.ui.focus == Focus::Search {
            match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Down => self.ui.focus = Focus::Grid,
                KeyCode::Backspace => {
                    let mut query = self.session.search_text().to_string();
                    query.pop();
                    self.update_search(query);
                }
                KeyCode::Char(c) => {
                    let query = format!("{}{}", self.session.search_text(), c);
                    self.update_search(query);
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('/') => self.ui.focus = Focus::Search,
            KeyCode::Char('e') => self.open_environments(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next_tool(),
            KeyCode::Up | KeyCode::Char('k') => self.select_prev_tool(),
            KeyCode::Tab => self.cycle_category(true),
            KeyCode::BackTab => self.cycle_category(false),
            KeyCode::Enter => self.open_selected_tool(),
            KeyCode::Esc if !self.session.search_text().is_empty() => self.update_search(String::new()),
            _ => {}
        }
    }

    fn update_search(&mut self, query: String) {
        self.session.search(&query);
        self.ui.selected_tool = 0;
    }

    pub fn select_next_tool(&mut self) {
        let count = self.session.visible_tools().len();
        if count > 0 {
            self.ui.selected_tool = (self.ui.selected_tool + 1) % count;
        }
    }

    pub fn select_prev_tool(&mut self) {
        let count = self.session.visible_tools().len();
        if count > 0 {
            self.ui.selected_tool = (self.ui.selected_tool + count - 1) % count;
        }
    }

    /// Category ids in filter order, `all` first.
    pub fn category_cycle(&self) -> Vec<String> {
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(self.session.categories_with_counts().into_iter().map(|c| c.category.id))
            .collect()
    }

    pub fn cycle_category(&mut self, forward: bool) {
        let ids = self.category_cycle();
        let current = ids
            .iter()
            .position(|id| id == self.session.selected_category())
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % ids.len()
        } else {
            (current + ids.len() - 1) % ids.len()
        };
        self.session.filter_by_category(&ids[next]);
        self.ui.selected_tool = 0;
    }

    pub fn open_selected_tool(&mut self) {
        let Some(tool) = self.session.visible_tools().into_iter().nth(self.ui.selected_tool) else {
            return;
        };

        match self.session.open_tool(&tool.id) {
            Ok(()) => {
                self.ui.tool = ToolPane::default();
                self.ui.clear_status();
                let notice = self
                    .session
                    .current_widget_mut()
                    .filter(|w| w.is_placeholder())
                    .map(|w| w.run("info", &ToolInput::new()));
                self.ui.tool.output = notice;
            }
            Err(DevhubError::ToolDisabled(_)) => {
                self.ui.set_error(format!("{} is coming soon", tool.name));
            }
            Err(e) => self.ui.set_error(e.to_string()),
        }
    }

    // Tool view

    fn handle_tool_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action_count = self.session.current_widget().map_or(0, |w| w.actions().len());

        match key.code {
            KeyCode::Esc => self.close_tool(),
            KeyCode::Tab => self.ui.tool.field = self.ui.tool.field.next(),
            KeyCode::BackTab => self.ui.tool.field = self.ui.tool.field.prev(),
            KeyCode::Up => self.ui.tool.select_prev_action(action_count),
            KeyCode::Down => self.ui.tool.select_next_action(action_count),
            KeyCode::F(5) => self.run_selected_action(),
            KeyCode::Char('r') if ctrl => self.run_selected_action(),
            KeyCode::Char('u') if ctrl => self.ui.tool.buffer_mut().clear(),
            KeyCode::Enter => self.ui.tool.buffer_mut().push('\n'),
            KeyCode::Backspace => {
                self.ui.tool.buffer_mut().pop();
            }
            KeyCode::Char(c) if !ctrl => self.ui.tool.buffer_mut().push(c),
            _ => {}
        }
    }

    pub fn close_tool(&mut self) {
        match self.session.close_tool() {
            Ok(()) => {
                self.ui.tool = ToolPane::default();
                self.ui.clear_status();
            }
            Err(e) => self.ui.set_error(e.to_string()),
        }
    }

    /// Action currently highlighted in the tool view.
    pub fn selected_action(&self) -> Option<&'static str> {
        let widget = self.session.current_widget()?;
        widget.actions().get(self.ui.tool.action).copied()
    }

    fn build_input(&self) -> std::result::Result<ToolInput, String> {
        let pane = &self.ui.tool;
        let mut input = ToolInput::text(pane.text.clone()).with_secondary(pane.secondary.clone());
        for (key, value) in pane.option_pairs() {
            input = input.with_option(key, value);
        }
        for path in pane.file_paths() {
            let bytes = std::fs::read(path).map_err(|e| format!("Cannot read {}: {}", path, e))?;
            let name = std::path::Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string());
            input = input.with_file(InputFile::new(name, bytes));
        }
        Ok(input)
    }

    pub fn run_selected_action(&mut self) {
        let Some(action) = self.selected_action() else {
            return;
        };
        let input = match self.build_input() {
            Ok(input) => input,
            Err(msg) => {
                self.ui.set_error(msg);
                return;
            }
        };

        debug!("Running action {}", action);
        let output = match self.session.run_current(action, &input) {
            Ok(output) => output,
            Err(e) => {
                self.ui.set_error(e.to_string());
                return;
            }
        };

        match &output.export {
            Some(export) => match export.save_in(&self.config.export_dir) {
                Ok(path) => {
                    info!("Exported {}", path.display());
                    self.ui.set_status(format!("Saved {}", path.display()));
                }
                Err(e) => self.ui.set_error(format!("Export failed: {}", e)),
            },
            None => self.ui.clear_status(),
        }
        self.ui.tool.output = Some(output);
    }

    // Environment manager

    pub fn open_environments(&mut self) {
        match self.session.open_environment_settings() {
            Ok(()) => {
                self.ui.env.selected = 0;
                self.ui.env.prompt = None;
                self.ui.clear_status();
            }
            Err(e) => self.ui.set_error(e.to_string()),
        }
    }

    pub fn environments(&self) -> Vec<Environment> {
        self.session.environments().list_all()
    }

    fn selected_environment(&self) -> Option<Environment> {
        self.environments().into_iter().nth(self.ui.env.selected)
    }

    fn handle_env_key(&mut self, key: KeyEvent) {
        if self.ui.env.prompt.is_some() {
            self.handle_prompt_key(key);
            return;
        }

        let count = self.environments().len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                if let Err(e) = self.session.close_environment_settings() {
                    self.ui.set_error(e.to_string());
                }
            }
            KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                self.ui.env.selected = (self.ui.env.selected + 1) % count;
            }
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                self.ui.env.selected = (self.ui.env.selected + count - 1) % count;
            }
            KeyCode::Char('n') => self.ui.env.prompt = Some(Prompt::new(PromptKind::NewEnvironment)),
            KeyCode::Char('v') if count > 0 => self.ui.env.prompt = Some(Prompt::new(PromptKind::AddVariable)),
            KeyCode::Char('a') | KeyCode::Enter => self.activate_selected(),
            KeyCode::Char('d') => self.delete_selected(),
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.ui.env.prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.ui.env.prompt = None,
            KeyCode::Backspace => {
                prompt.buffer.pop();
            }
            KeyCode::Char(c) => prompt.buffer.push(c),
            KeyCode::Enter => {
                if let Some(prompt) = self.ui.env.prompt.take() {
                    self.submit_prompt(prompt);
                }
            }
            _ => {}
        }
    }

    fn submit_prompt(&mut self, prompt: Prompt) {
        match prompt.kind {
            PromptKind::NewEnvironment => {
                let name = prompt.buffer.trim();
                if name.is_empty() {
                    self.ui.set_error("Environment name is required");
                    return;
                }
                let env = Environment {
                    name: name.to_string(),
                    ..Environment::default_template()
                };
                match self.session.environments().save(env) {
                    Some(saved) => {
                        self.ui.env.selected = self.environments().len().saturating_sub(1);
                        self.ui.set_status(format!("Created {}", saved.name));
                    }
                    None => self.ui.set_error("Failed to save environment"),
                }
            }
            PromptKind::AddVariable => {
                let Some((key, value)) = prompt.buffer.split_once('=') else {
                    self.ui.set_error("Use key=value");
                    return;
                };
                let key = key.trim();
                let Some(env) = self.selected_environment() else {
                    return;
                };
                if key.is_empty() {
                    self.ui.set_error("Variable name is required");
                } else if self.session.environments().add_variable(env.id_str(), key, value.trim()) {
                    self.ui.set_status(format!("Set {} in {}", key, env.name));
                } else {
                    self.ui.set_error("Failed to save variable");
                }
            }
        }
    }

    fn activate_selected(&mut self) {
        let Some(env) = self.selected_environment() else {
            return;
        };
        if self.session.environments().set_active(env.id_str()) {
            self.ui.set_status(format!("Active environment: {}", env.name));
        } else {
            self.ui.set_error("Failed to activate environment");
        }
    }

    fn delete_selected(&mut self) {
        let Some(env) = self.selected_environment() else {
            return;
        };
        if self.session.environments().delete(env.id_str()) {
            self.ui.env.clamp(self.environments().len());
            self.ui.set_status(format!("Deleted {}", env.name));
        } else {
            self.ui.set_error("Failed to delete environment");
        }
    }
}
