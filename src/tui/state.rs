//! UI-only state layered over the session.
//!
//! The [`AppSession`](crate::controller::AppSession) decides what is open;
//! this module holds what the terminal needs on top of it: focus, the text
//! being typed, selections and the status line.

use crate::tools::ToolOutput;

/// Which part of the home screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Grid,
    Search,
}

/// Editable fields of the tool view, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolField {
    #[default]
    Text,
    Secondary,
    Options,
    Files,
}

impl ToolField {
    pub fn next(self) -> Self {
        match self {
            Self::Text => Self::Secondary,
            Self::Secondary => Self::Options,
            Self::Options => Self::Files,
            Self::Files => Self::Text,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Text => Self::Files,
            Self::Secondary => Self::Text,
            Self::Options => Self::Secondary,
            Self::Files => Self::Options,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Text => "Input",
            Self::Secondary => "Second input",
            Self::Options => "Options (key=value per line)",
            Self::Files => "Files (one path per line)",
        }
    }
}

/// Buffers and output of the open tool.
#[derive(Debug, Default)]
pub struct ToolPane {
    pub text: String,
    pub secondary: String,
    pub options: String,
    pub files: String,
    pub field: ToolField,
    /// Index into the widget's action list
    pub action: usize,
    pub output: Option<ToolOutput>,
}

impl ToolPane {
    pub fn buffer_mut(&mut self) -> &mut String {
        match self.field {
            ToolField::Text => &mut self.text,
            ToolField::Secondary => &mut self.secondary,
            ToolField::Options => &mut self.options,
            ToolField::Files => &mut self.files,
        }
    }

    pub fn buffer(&self, field: ToolField) -> &str {
        match field {
            ToolField::Text => &self.text,
            ToolField::Secondary => &self.secondary,
            ToolField::Options => &self.options,
            ToolField::Files => &self.files,
        }
    }

    /// `key=value` lines of the options buffer. Lines without `=` are skipped.
    pub fn option_pairs(&self) -> Vec<(String, String)> {
        self.options
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.to_string()))
            .filter(|(k, _)| !k.is_empty())
            .collect()
    }

    pub fn file_paths(&self) -> Vec<&str> {
        self.files.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
    }

    pub fn select_next_action(&mut self, count: usize) {
        if count > 0 {
            self.action = (self.action + 1) % count;
        }
    }

    pub fn select_prev_action(&mut self, count: usize) {
        if count > 0 {
            self.action = (self.action + count - 1) % count;
        }
    }
}

/// What a one-line prompt in the environment manager is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    NewEnvironment,
    AddVariable,
}

impl PromptKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::NewEnvironment => "New environment name",
            Self::AddVariable => "Variable (key=value)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub buffer: String,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            buffer: String::new(),
        }
    }
}

/// Selection and prompt of the environment manager.
#[derive(Debug, Default)]
pub struct EnvPane {
    pub selected: usize,
    pub prompt: Option<Prompt>,
}

impl EnvPane {
    /// Keep the selection inside a list of `len` environments.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

/// Everything the terminal shows that the session does not own.
#[derive(Debug, Default)]
pub struct UiState {
    pub focus: Focus,
    /// Index into the visible tools
    pub selected_tool: usize,
    pub tool: ToolPane,
    pub env: EnvPane,
    pub status: Option<StatusLine>,
    pub should_quit: bool,
}

impl UiState {
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: true,
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }
}
