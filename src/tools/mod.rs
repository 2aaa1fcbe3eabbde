//! Tool widgets - the leaf utilities opened from the hub
//!
//! Every widget accepts named actions with a [`ToolInput`] and answers with a
//! [`ToolOutput`]. Bad input never panics or propagates: it comes back as an
//! error output the caller shows inline.

mod codec;
mod columnar;
mod csv;
mod diagram;
mod diff;
mod factory;
mod guid;
mod hash;
mod json;
mod listener;
mod messaging;
mod placeholder;
mod sender;

pub use codec::Base64Codec;
pub use columnar::{ColumnarDecoder, ColumnarViewer, Column, DecodedTable, MockColumnarDecoder, PageSize};
pub use csv::CsvConverter;
pub use diagram::{CommandRenderer, DiagramKind, DiagramRenderer, DiagramViewer, ImageFormat};
pub use diff::DiffChecker;
pub use factory::{ToolFactory, ToolKind, WidgetContext};
pub use guid::GuidGenerator;
pub use hash::Sha256Hasher;
pub use json::JsonBeautifier;
pub use listener::{ListenerSettings, LogEntry, MessageListener, ReceivedMessage};
pub use messaging::{MessagingForm, SendRecord};
pub use placeholder::Placeholder;
pub use sender::MessageSender;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::catalog::ToolDescriptor;
use crate::error::Result;

/// A file handed to a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Everything a single action may read.
#[derive(Debug, Clone, Default)]
pub struct ToolInput {
    /// Main text field
    pub text: String,
    /// Second text field (diff right side, message properties)
    pub secondary: String,
    /// Named form values (`delimiter`, `page`, `connectionString`, ...)
    pub options: BTreeMap<String, String>,
    pub files: Vec<InputFile>,
}

impl ToolInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary = secondary.into();
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_file(mut self, file: InputFile) -> Self {
        self.files.push(file);
        self
    }

    /// Option value, `None` when unset.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Option value trimmed, empty when unset.
    pub fn option_trimmed(&self, key: &str) -> &str {
        self.option(key).map(str::trim).unwrap_or("")
    }

    /// Boolean option; `true`, `yes`, `1` and `on` count as set.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.option(key) {
            Some(v) => matches!(v.trim().to_lowercase().as_str(), "true" | "yes" | "1" | "on"),
            None => default,
        }
    }
}

/// A file produced for the user to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Write the file into `dir` under its own name.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }

    /// Write the file to `path`, or into the current directory when `None`.
    pub fn save_to(&self, path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(p) if p.is_dir() => self.save_in(p),
            Some(p) => {
                std::fs::write(p, &self.bytes)?;
                Ok(p.to_path_buf())
            }
            None => self.save_in(Path::new(".")),
        }
    }
}

/// Result of one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
    pub export: Option<ExportFile>,
}

impl ToolOutput {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
            export: None,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
            export: None,
        }
    }

    /// Attach a file to save.
    pub fn with_export(mut self, file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.export = Some(ExportFile {
            file_name: file_name.into(),
            bytes: bytes.into(),
        });
        self
    }

    pub(crate) fn unknown_action(tool: &str, action: &str) -> Self {
        Self::error(format!("Unknown action '{}' for {}", action, tool))
    }
}

/// Behavior shared by every widget.
pub trait ToolWidget: Send {
    fn descriptor(&self) -> &ToolDescriptor;

    /// Action names accepted by [`ToolWidget::run`].
    fn actions(&self) -> &'static [&'static str];

    /// Perform one action.
    fn run(&mut self, action: &str, input: &ToolInput) -> ToolOutput;

    /// Called after the widget is shown.
    fn on_open(&mut self) {}

    /// Called when the widget is dismissed.
    fn on_close(&mut self) {}
}

/// A widget of one of the known kinds.
pub enum Widget {
    Json(JsonBeautifier),
    Base64(Base64Codec),
    Hash(Sha256Hasher),
    Guid(GuidGenerator),
    Diff(DiffChecker),
    Csv(CsvConverter),
    Diagram(DiagramViewer),
    Columnar(ColumnarViewer),
    Sender(MessageSender),
    Listener(MessageListener),
    Placeholder(Placeholder),
}

impl Widget {
    fn inner(&self) -> &dyn ToolWidget {
        match self {
            Self::Json(w) => w,
            Self::Base64(w) => w,
            Self::Hash(w) => w,
            Self::Guid(w) => w,
            Self::Diff(w) => w,
            Self::Csv(w) => w,
            Self::Diagram(w) => w,
            Self::Columnar(w) => w,
            Self::Sender(w) => w,
            Self::Listener(w) => w,
            Self::Placeholder(w) => w,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ToolWidget {
        match self {
            Self::Json(w) => w,
            Self::Base64(w) => w,
            Self::Hash(w) => w,
            Self::Guid(w) => w,
            Self::Diff(w) => w,
            Self::Csv(w) => w,
            Self::Diagram(w) => w,
            Self::Columnar(w) => w,
            Self::Sender(w) => w,
            Self::Listener(w) => w,
            Self::Placeholder(w) => w,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    pub fn as_listener(&self) -> Option<&MessageListener> {
        match self {
            Self::Listener(l) => Some(l),
            _ => None,
        }
    }
}

impl ToolWidget for Widget {
    fn descriptor(&self) -> &ToolDescriptor {
        self.inner().descriptor()
    }

    fn actions(&self) -> &'static [&'static str] {
        self.inner().actions()
    }

    fn run(&mut self, action: &str, input: &ToolInput) -> ToolOutput {
        self.inner_mut().run(action, input)
    }

    fn on_open(&mut self) {
        self.inner_mut().on_open()
    }

    fn on_close(&mut self) {
        self.inner_mut().on_close()
    }
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Widget").field(&self.descriptor().id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_output_success() {
        let output = ToolOutput::success("done");
        assert_eq!(output.content, "done");
        assert!(!output.is_error);
        assert!(output.export.is_none());
    }

    #[test]
    fn test_tool_output_error() {
        let output = ToolOutput::error("bad");
        assert!(output.is_error);
    }

    #[test]
    fn test_tool_output_export() {
        let output = ToolOutput::success("saved").with_export("a.txt", "abc");
        let export = output.export.unwrap();
        assert_eq!(export.file_name, "a.txt");
        assert_eq!(export.bytes, b"abc");
    }

    #[test]
    fn test_input_options() {
        let input = ToolInput::text("x")
            .with_option("header", "yes")
            .with_option("delimiter", " ; ");
        assert!(input.flag("header", false));
        assert!(!input.flag("missing", false));
        assert!(input.flag("missing", true));
        assert_eq!(input.option_trimmed("delimiter"), ";");
        assert_eq!(input.option_trimmed("nope"), "");
    }

    #[test]
    fn test_export_save_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let export = ExportFile {
            file_name: "out.csv".to_string(),
            bytes: b"a,b".to_vec(),
        };
        let path = export.save_to(Some(dir.path())).unwrap();
        assert_eq!(path, dir.path().join("out.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b");

        let named = dir.path().join("renamed.csv");
        assert_eq!(export.save_to(Some(&named)).unwrap(), named);
        assert!(named.exists());
    }
}
