//! TUI Runner - main event loop.
//!
//! The `TuiRunner` owns the terminal, app, and event handler. It runs the
//! main loop: render → handle events → repeat.

use eyre::Result;
use log::info;

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::views::render;
use crate::controller::ControllerState;

/// Main TUI runner that owns the event loop.
pub struct TuiRunner {
    terminal: Tui,
    app: App,
    event_handler: EventHandler,
}

impl TuiRunner {
    pub fn new(terminal: Tui, app: App) -> Self {
        let event_handler = EventHandler::new(app.config.tick_rate_ms);
        Self {
            terminal,
            app,
            event_handler,
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Run until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        info!("Starting TUI main loop");

        loop {
            self.terminal.draw(|f| render(&self.app, f))?;

            match self.event_handler.next().await? {
                Event::Key(key) => {
                    if self.app.handle_key(key) {
                        break;
                    }
                }
                // Redrawing is the whole job: listener logs are read at draw time
                Event::Tick | Event::Resize(_, _) => {}
            }

            if self.app.ui.should_quit {
                break;
            }
        }

        // Stop any listener timer before the runtime goes away
        if self.app.session.state() == ControllerState::ToolOpen {
            self.app.close_tool();
        }

        info!("TUI main loop ended");
        Ok(())
    }
}
