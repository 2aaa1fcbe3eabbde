//! Positional line-by-line text comparison.

use super::{ToolInput, ToolOutput, ToolWidget};
use crate::catalog::ToolDescriptor;

pub struct DiffChecker {
    descriptor: ToolDescriptor,
}

impl DiffChecker {
    pub fn new(descriptor: ToolDescriptor) -> Self {
        Self { descriptor }
    }

    /// Compare two texts line by line at equal positions.
    ///
    /// There is no alignment: an inserted line shifts every later line.
    pub fn compare(left: &str, right: &str) -> String {
        let lines1: Vec<&str> = left.split('\n').collect();
        let lines2: Vec<&str> = right.split('\n').collect();
        let max_lines = lines1.len().max(lines2.len());

        let mut body = String::new();
        for i in 0..max_lines {
            let line1 = lines1.get(i).copied().unwrap_or("");
            let line2 = lines2.get(i).copied().unwrap_or("");

            if line1 == line2 {
                body.push_str(&format!("  {}\n", line1));
            } else {
                if !line1.is_empty() {
                    body.push_str(&format!("- {}\n", line1));
                }
                if !line2.is_empty() {
                    body.push_str(&format!("+ {}\n", line2));
                }
            }
        }

        let status = if left == right { "✓ Identical" } else { "✗ Different" };
        format!(
            "Lines in Text 1: {}\nLines in Text 2: {}\nStatus: {}\n\n{}",
            lines1.len(),
            lines2.len(),
            status,
            body
        )
    }
}

impl ToolWidget for DiffChecker {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn actions(&self) -> &'static [&'static str] {
        &["compare"]
    }

    fn run(&mut self, action: &str, input: &ToolInput) -> ToolOutput {
        match action {
            "compare" if input.text.is_empty() || input.secondary.is_empty() => {
                ToolOutput::error("Please enter both texts to compare")
            }
            "compare" => ToolOutput::success(Self::compare(&input.text, &input.secondary)),
            _ => ToolOutput::unknown_action(&self.descriptor.name, action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        let out = DiffChecker::compare("a\nb", "a\nb");
        assert_eq!(out, "Lines in Text 1: 2\nLines in Text 2: 2\nStatus: ✓ Identical\n\n  a\n  b\n");
    }

    #[test]
    fn test_changed_line() {
        let out = DiffChecker::compare("a\nb\nc", "a\nx\nc");
        assert!(out.contains("Status: ✗ Different"));
        assert!(out.ends_with("  a\n- b\n+ x\n  c\n"));
    }

    #[test]
    fn test_extra_lines_on_right() {
        let out = DiffChecker::compare("a", "a\nb");
        assert!(out.starts_with("Lines in Text 1: 1\nLines in Text 2: 2\n"));
        assert!(out.ends_with("  a\n+ b\n"));
    }

    #[test]
    fn test_empty_side_omitted() {
        let out = DiffChecker::compare("a\n\nc", "a\nb\nc");
        assert!(out.ends_with("  a\n+ b\n  c\n"));
    }

    #[test]
    fn test_both_required() {
        let mut w = DiffChecker::new(ToolDescriptor::new("diff-checker", "Diff"));
        let out = w.run("compare", &ToolInput::text("a"));
        assert!(out.is_error);
        assert_eq!(out.content, "Please enter both texts to compare");
        assert!(!w.run("compare", &ToolInput::text("a").with_secondary("b")).is_error);
    }
}
