//! Application session: catalog, filters, environment indicator and the
//! currently open tool, driven through an explicit state machine.

mod session;
mod state;

pub use session::{ALL_CATEGORIES, AppSession, CategoryCount};
pub use state::ControllerState;
