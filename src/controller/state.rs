//! Presentation states of an application session.

use std::fmt;

/// Where the session currently is.
///
/// `Loading` only exists until the catalog is in; every later state is
/// reachable from `Ready` and returns to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Loading,
    Ready,
    ToolOpen,
    EnvironmentSettingsOpen,
}

impl ControllerState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::ToolOpen => "tool open",
            Self::EnvironmentSettingsOpen => "environment settings open",
        }
    }

    /// Whether `target` may follow this state.
    pub fn can_transition_to(&self, target: ControllerState) -> bool {
        use ControllerState::*;
        matches!(
            (self, target),
            (Loading, Ready)
                | (Ready, ToolOpen)
                | (ToolOpen, Ready)
                | (Ready, EnvironmentSettingsOpen)
                | (EnvironmentSettingsOpen, Ready)
        )
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
