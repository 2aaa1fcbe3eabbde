//! JSON beautify, minify and validate.

use serde_json::Value;

use super::{ToolInput, ToolOutput, ToolWidget};
use crate::catalog::ToolDescriptor;

pub struct JsonBeautifier {
    descriptor: ToolDescriptor,
}

impl JsonBeautifier {
    pub fn new(descriptor: ToolDescriptor) -> Self {
        Self { descriptor }
    }

    fn beautify(&self, text: &str) -> ToolOutput {
        match serde_json::from_str::<Value>(text).and_then(|v| serde_json::to_string_pretty(&v)) {
            Ok(pretty) => ToolOutput::success(pretty),
            Err(e) => ToolOutput::error(format!("Error: {}", e)),
        }
    }

    fn minify(&self, text: &str) -> ToolOutput {
        match serde_json::from_str::<Value>(text).and_then(|v| serde_json::to_string(&v)) {
            Ok(compact) => ToolOutput::success(compact),
            Err(e) => ToolOutput::error(format!("Error: {}", e)),
        }
    }

    fn validate(&self, text: &str) -> ToolOutput {
        match serde_json::from_str::<Value>(text) {
            Ok(_) => ToolOutput::success("✓ Valid JSON"),
            Err(e) => ToolOutput::error(format!("✗ Invalid JSON\n\n{}", e)),
        }
    }
}

impl ToolWidget for JsonBeautifier {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn actions(&self) -> &'static [&'static str] {
        &["beautify", "minify", "validate"]
    }

    fn run(&mut self, action: &str, input: &ToolInput) -> ToolOutput {
        match action {
            "beautify" => self.beautify(&input.text),
            "minify" => self.minify(&input.text),
            "validate" => self.validate(&input.text),
            _ => ToolOutput::unknown_action(&self.descriptor.name, action),
        }
    }
}
