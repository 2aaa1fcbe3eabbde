//! Mermaid diagram preview and export.
//!
//! Rendering goes through [`DiagramRenderer`]. The default renderer runs the
//! Mermaid CLI; nothing is spawned until the first render.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use log::{debug, info, warn};

use super::{ToolInput, ToolOutput, ToolWidget};
use crate::catalog::ToolDescriptor;
use crate::error::{DevhubError, Result};
use crate::id::now_ms;

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

/// Turns diagram source into an image.
pub trait DiagramRenderer: Send + Sync {
    fn render(&self, code: &str, format: ImageFormat) -> Result<Vec<u8>>;
}

/// Renderer backed by an external command taking `-i <input> -o <output>`.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    command: String,
    work_dir: PathBuf,
}

impl CommandRenderer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            work_dir: std::env::temp_dir(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl DiagramRenderer for CommandRenderer {
    fn render(&self, code: &str, format: ImageFormat) -> Result<Vec<u8>> {
        let stem = format!("devhub-diagram-{}", uuid::Uuid::new_v4());
        let input = self.work_dir.join(format!("{}.mmd", stem));
        let output = self.work_dir.join(format!("{}.{}", stem, format.extension()));

        std::fs::write(&input, code)?;
        debug!("Running {} for {}", self.command, input.display());

        let result = Command::new(&self.command)
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .arg("-b")
            .arg("white")
            .output();

        let rendered = match result {
            Ok(out) if out.status.success() => std::fs::read(&output).map_err(DevhubError::from),
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                let message = stderr.lines().find(|l| !l.trim().is_empty()).unwrap_or("Invalid Mermaid syntax");
                Err(DevhubError::Render(message.trim().to_string()))
            }
            Err(e) => Err(DevhubError::Render(format!(
                "Diagram renderer '{}' is not available: {}",
                self.command, e
            ))),
        };

        for path in [&input, &output] {
            if path.exists()
                && let Err(e) = std::fs::remove_file(path)
            {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
        rendered
    }
}

/// Built-in starter diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramKind {
    Flowchart,
    Sequence,
    Gantt,
    Class,
    State,
    Pie,
}

impl DiagramKind {
    pub fn all() -> &'static [DiagramKind] {
        &[
            Self::Flowchart,
            Self::Sequence,
            Self::Gantt,
            Self::Class,
            Self::State,
            Self::Pie,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Sequence => "sequence",
            Self::Gantt => "gantt",
            Self::Class => "class",
            Self::State => "state",
            Self::Pie => "pie",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name.trim().to_lowercase())
    }

    pub fn template(&self) -> &'static str {
        match self {
            Self::Flowchart => {
                "graph TD\n    A[Start] --> B{Decision}\n    B -->|Yes| C[Option 1]\n    B -->|No| D[Option 2]\n    C --> E[End]\n    D --> E"
            }
            Self::Sequence => {
                "sequenceDiagram\n    participant Alice\n    participant Bob\n    Alice->>Bob: Hello Bob!\n    Bob->>Alice: Hi Alice!\n    Alice->>Bob: How are you?\n    Bob->>Alice: I'm good, thanks!"
            }
            Self::Gantt => {
                "gantt\n    title Project Schedule\n    dateFormat YYYY-MM-DD\n    section Phase 1\n    Task 1: a1, 2024-01-01, 7d\n    Task 2: a2, after a1, 5d\n    section Phase 2\n    Task 3: a3, 2024-01-15, 10d"
            }
            Self::Class => {
                "classDiagram\n    class Animal {\n        +String name\n        +int age\n        +makeSound()\n    }\n    class Dog {\n        +String breed\n        +bark()\n    }\n    Animal <|-- Dog"
            }
            Self::State => {
                "stateDiagram-v2\n    [*] --> Idle\n    Idle --> Processing: Start\n    Processing --> Success: Complete\n    Processing --> Failed: Error\n    Success --> [*]\n    Failed --> Idle: Retry"
            }
            Self::Pie => {
                "pie title Favorite Pets\n    \"Dogs\" : 45\n    \"Cats\" : 30\n    \"Birds\" : 15\n    \"Fish\" : 10"
            }
        }
    }
}

pub struct DiagramViewer {
    descriptor: ToolDescriptor,
    renderer: Arc<dyn DiagramRenderer>,
    current_svg: Option<String>,
    current_code: Option<String>,
}

impl DiagramViewer {
    pub fn new(descriptor: ToolDescriptor, renderer: Arc<dyn DiagramRenderer>) -> Self {
        Self {
            descriptor,
            renderer,
            current_svg: None,
            current_code: None,
        }
    }

    pub fn current_svg(&self) -> Option<&str> {
        self.current_svg.as_deref()
    }

    pub fn current_code(&self) -> Option<&str> {
        self.current_code.as_deref()
    }

    fn template(&self, input: &ToolInput) -> ToolOutput {
        let name = input.option("template").unwrap_or(&input.text);
        match DiagramKind::from_name(name) {
            Some(kind) => ToolOutput::success(kind.template()),
            None => {
                let names: Vec<&str> = DiagramKind::all().iter().map(|k| k.name()).collect();
                ToolOutput::error(format!("Unknown template '{}'. Available: {}", name.trim(), names.join(", ")))
            }
        }
    }

    fn render(&mut self, input: &ToolInput) -> ToolOutput {
        let code = input.text.trim();
        if code.is_empty() {
            return ToolOutput::error("Please enter Mermaid diagram code.");
        }

        match self.renderer.render(code, ImageFormat::Svg) {
            Ok(bytes) => {
                let svg = String::from_utf8_lossy(&bytes).into_owned();
                let summary = format!(
                    "Diagram rendered successfully!\n\n{} lines of source, {} bytes of SVG",
                    code.lines().count(),
                    svg.len()
                );
                self.current_svg = Some(svg);
                self.current_code = Some(code.to_string());
                info!("Rendered diagram ({} bytes)", bytes.len());
                ToolOutput::success(summary)
            }
            Err(e) => {
                warn!("Diagram render failed: {}", e);
                let message = match e {
                    DevhubError::Render(msg) => msg,
                    other => other.to_string(),
                };
                ToolOutput::error(format!("Rendering error: {}", message))
            }
        }
    }

    fn export(&self, format: ImageFormat) -> ToolOutput {
        let (Some(svg), Some(code)) = (&self.current_svg, &self.current_code) else {
            return ToolOutput::error("Please render a diagram first before exporting.");
        };

        let file_name = format!("mermaid-diagram-{}.{}", now_ms(), format.extension());
        match format {
            ImageFormat::Svg => {
                ToolOutput::success("SVG exported successfully!").with_export(file_name, svg.as_bytes())
            }
            ImageFormat::Png => match self.renderer.render(code, ImageFormat::Png) {
                Ok(bytes) => ToolOutput::success("PNG exported successfully!").with_export(file_name, bytes),
                Err(e) => {
                    warn!("PNG export failed: {}", e);
                    ToolOutput::error("Failed to convert diagram to PNG. Try exporting as SVG instead.")
                }
            },
        }
    }

    fn clear(&mut self) -> ToolOutput {
        self.current_svg = None;
        self.current_code = None;
        ToolOutput::success("Your diagram will appear here...")
    }
}

impl ToolWidget for DiagramViewer {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn actions(&self) -> &'static [&'static str] {
        &["template", "render", "export-svg", "export-png", "clear"]
    }

    fn run(&mut self, action: &str, input: &ToolInput) -> ToolOutput {
        match action {
            "template" => self.template(input),
            "render" => self.render(input),
            "export-svg" => self.export(ImageFormat::Svg),
            "export-png" => self.export(ImageFormat::Png),
            "clear" => self.clear(),
            _ => ToolOutput::unknown_action(&self.descriptor.name, action),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Renderer returning a fixed SVG, or failing on code containing `fail`.
    pub(crate) struct MockRenderer;

    impl DiagramRenderer for MockRenderer {
        fn render(&self, code: &str, format: ImageFormat) -> Result<Vec<u8>> {
            if code.contains("fail") {
                return Err(DevhubError::Render("Parse error on line 1".to_string()));
            }
            match format {
                ImageFormat::Svg => Ok(b"<svg width=\"10\" height=\"10\"></svg>".to_vec()),
                ImageFormat::Png => Ok(vec![0x89, b'P', b'N', b'G']),
            }
        }
    }

    fn widget() -> DiagramViewer {
        DiagramViewer::new(ToolDescriptor::new("mermaid-viewer", "Mermaid"), Arc::new(MockRenderer))
    }

    #[test]
    fn test_templates() {
        let mut w = widget();
        for kind in DiagramKind::all() {
            let out = w.run("template", &ToolInput::text(kind.name()));
            assert!(!out.is_error);
            assert_eq!(out.content, kind.template());
        }
        assert!(DiagramKind::Flowchart.template().starts_with("graph TD"));
        assert!(DiagramKind::State.template().starts_with("stateDiagram-v2"));
    }

    #[test]
    fn test_unknown_template() {
        let out = widget().run("template", &ToolInput::text("venn"));
        assert!(out.is_error);
        assert!(out.content.contains("flowchart"));
    }

    #[test]
    fn test_render_requires_code() {
        let out = widget().run("render", &ToolInput::text("  "));
        assert_eq!(out.content, "Please enter Mermaid diagram code.");
    }

    #[test]
    fn test_render_stores_svg() {
        let mut w = widget();
        let out = w.run("render", &ToolInput::text(DiagramKind::Pie.template()));
        assert!(!out.is_error);
        assert!(w.current_svg().unwrap().starts_with("<svg"));
        assert_eq!(w.current_code(), Some(DiagramKind::Pie.template()));
    }

    #[test]
    fn test_render_failure_keeps_widget_usable() {
        let mut w = widget();
        let out = w.run("render", &ToolInput::text("graph fail"));
        assert!(out.is_error);
        assert_eq!(out.content, "Rendering error: Parse error on line 1");
        assert!(!w.run("render", &ToolInput::text("graph TD")).is_error);
    }

    #[test]
    fn test_export_requires_render() {
        let mut w = widget();
        let out = w.run("export-svg", &ToolInput::new());
        assert_eq!(out.content, "Please render a diagram first before exporting.");
    }

    #[test]
    fn test_export_svg_and_png() {
        let mut w = widget();
        w.run("render", &ToolInput::text("graph TD"));

        let svg = w.run("export-svg", &ToolInput::new()).export.unwrap();
        assert!(svg.file_name.starts_with("mermaid-diagram-"));
        assert!(svg.file_name.ends_with(".svg"));

        let png = w.run("export-png", &ToolInput::new()).export.unwrap();
        assert!(png.file_name.ends_with(".png"));
        assert_eq!(&png.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_clear_resets() {
        let mut w = widget();
        w.run("render", &ToolInput::text("graph TD"));
        w.run("clear", &ToolInput::new());
        assert!(w.current_svg().is_none());
        assert!(w.run("export-svg", &ToolInput::new()).is_error);
    }

    #[test]
    fn test_missing_command_is_render_error() {
        let renderer = CommandRenderer::new("devhub-no-such-renderer-binary");
        let result = renderer.render("graph TD", ImageFormat::Svg);
        assert!(matches!(result, Err(DevhubError::Render(_))));
    }
}
