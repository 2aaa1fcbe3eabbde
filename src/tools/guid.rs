//! Random v4 UUID generation.

use uuid::Uuid;

use super::{ToolInput, ToolOutput, ToolWidget};
use crate::catalog::ToolDescriptor;

const DEFAULT_BATCH: usize = 10;
const MAX_BATCH: usize = 1000;

pub struct GuidGenerator {
    descriptor: ToolDescriptor,
}

impl GuidGenerator {
    pub fn new(descriptor: ToolDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn generate(count: usize) -> Vec<String> {
        (0..count).map(|_| Uuid::new_v4().to_string()).collect()
    }

    fn generate_many(&self, input: &ToolInput) -> ToolOutput {
        let count = match input.option("count") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if (1..=MAX_BATCH).contains(&n) => n,
                _ => return ToolOutput::error(format!("Count must be between 1 and {}", MAX_BATCH)),
            },
            None => DEFAULT_BATCH,
        };
        ToolOutput::success(Self::generate(count).join("\n"))
    }
}

impl ToolWidget for GuidGenerator {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn actions(&self) -> &'static [&'static str] {
        &["generate", "generate-many"]
    }

    fn run(&mut self, action: &str, input: &ToolInput) -> ToolOutput {
        match action {
            "generate" => ToolOutput::success(Self::generate(1).join("")),
            "generate-many" => self.generate_many(input),
            _ => ToolOutput::unknown_action(&self.descriptor.name, action),
        }
    }
}
