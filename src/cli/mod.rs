//! Command-line interface for devhub.

pub mod commands;

pub use commands::{Cli, Commands, EnvCommands};
