//! devhub - a terminal hub of developer utilities
//!
//! A catalog of small tools (formatters, encoders, generators, converters,
//! viewers and simulated messaging clients) opened from one session, with
//! named environments whose variables fill `{{name}}` placeholders.

pub mod catalog;
pub mod controller;
pub mod environment;
pub mod error;
pub mod id;
pub mod search;
pub mod storage;
pub mod tools;
pub mod tui;

pub use error::{DevhubError, Result};
