//! Terminal User Interface for devhub.
//!
//! A single-screen hub in the k9s style:
//! - **Home**: category filter, search box and the tool list
//! - **Tool**: input fields, action picker and output of the open tool
//! - **Environments**: the environment manager
//!
//! The TUI runs on the main tokio runtime so listener timers keep ticking
//! between frames.

mod app;
mod events;
mod runner;
mod state;
mod views;

pub use app::{App, AppConfig};
pub use events::{Event, EventHandler};
pub use runner::TuiRunner;
pub use state::{EnvPane, Focus, Prompt, PromptKind, StatusLine, ToolField, ToolPane, UiState};

use crossterm::{
    ExecutableCommand,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use eyre::Result;
use ratatui::prelude::*;
use std::io::{Stdout, stdout};

/// Type alias for our terminal backend.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Enable raw mode and switch to the alternate screen.
pub fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Leave the alternate screen and give the shell its terminal back.
pub fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Palette, k9s flavoured.
pub mod colors {
    use ratatui::style::Color;

    pub const ENABLED: Color = Color::Rgb(0, 255, 127); // Spring green
    pub const COMING_SOON: Color = Color::Rgb(255, 215, 0); // Gold
    pub const SUCCESS: Color = Color::Rgb(50, 205, 50); // Lime green
    pub const ERROR: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const ACTIVE_ENV: Color = Color::Rgb(81, 207, 102);
    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const FOCUS: Color = Color::Rgb(255, 255, 0); // Yellow
    pub const DIM: Color = Color::DarkGray;
}
