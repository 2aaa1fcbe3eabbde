//! Substring search over the tool list.

use crate::catalog::ToolDescriptor;

/// Linear, unranked filter over a fixed tool list.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    tools: Vec<ToolDescriptor>,
}

impl SearchIndex {
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self { tools }
    }

    /// Replace the indexed tools.
    pub fn set_tools(&mut self, tools: Vec<ToolDescriptor>) {
        self.tools = tools;
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Tools whose name, description, category or id contains `query`,
    /// ignoring case. A blank query matches everything. Order is preserved.
    pub fn search(&self, query: &str) -> Vec<ToolDescriptor> {
        if query.trim().is_empty() {
            return self.tools.clone();
        }

        let needle = query.to_lowercase();
        self.tools
            .iter()
            .filter(|tool| matches(tool, &needle))
            .cloned()
            .collect()
    }
}

fn matches(tool: &ToolDescriptor, needle: &str) -> bool {
    [&tool.name, &tool.description, &tool.category, &tool.id]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}
