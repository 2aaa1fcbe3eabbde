//! Stand-in widget for tools without an implementation yet.

use super::{ToolInput, ToolOutput, ToolWidget};
use crate::catalog::ToolDescriptor;

pub struct Placeholder {
    descriptor: ToolDescriptor,
}

impl Placeholder {
    pub fn new(descriptor: ToolDescriptor) -> Self {
        Self { descriptor }
    }

    /// Text shown in place of a working tool.
    pub fn notice(&self) -> String {
        format!(
            "{} {}\n\n{}\n\nThis tool is coming soon! Check back later.",
            self.descriptor.icon, self.descriptor.name, self.descriptor.description
        )
    }
}

impl ToolWidget for Placeholder {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn actions(&self) -> &'static [&'static str] {
        &["info"]
    }

    fn run(&mut self, action: &str, _input: &ToolInput) -> ToolOutput {
        match action {
            "info" => ToolOutput::success(self.notice()),
            _ => ToolOutput::error(format!("{} is not available yet", self.descriptor.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice() {
        let mut w = Placeholder::new(
            ToolDescriptor::new("jwt-decoder", "JWT Decoder").with_description("Decode tokens"),
        );
        let out = w.run("info", &ToolInput::new());
        assert!(out.content.contains("JWT Decoder"));
        assert!(out.content.contains("coming soon"));
    }

    #[test]
    fn test_other_actions_error() {
        let mut w = Placeholder::new(ToolDescriptor::new("x", "X"));
        assert!(w.run("decode", &ToolInput::new()).is_error);
    }
}
