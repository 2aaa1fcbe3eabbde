//! SHA-256 digest of text.

use sha2::{Digest, Sha256};

use super::{ToolInput, ToolOutput, ToolWidget};
use crate::catalog::ToolDescriptor;

pub struct Sha256Hasher {
    descriptor: ToolDescriptor,
}

impl Sha256Hasher {
    pub fn new(descriptor: ToolDescriptor) -> Self {
        Self { descriptor }
    }

    /// Lowercase hex digest of the UTF-8 bytes of `text`.
    pub fn digest(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl ToolWidget for Sha256Hasher {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn actions(&self) -> &'static [&'static str] {
        &["hash"]
    }

    fn run(&mut self, action: &str, input: &ToolInput) -> ToolOutput {
        match action {
            "hash" if input.text.is_empty() => ToolOutput::error("Please enter text to hash"),
            "hash" => ToolOutput::success(Self::digest(&input.text)),
            _ => ToolOutput::unknown_action(&self.descriptor.name, action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Sha256Hasher {
        Sha256Hasher::new(ToolDescriptor::new("sha256-hash", "SHA-256"))
    }

    #[test]
    fn test_digest_known_value() {
        assert_eq!(
            Sha256Hasher::digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_action() {
        let out = widget().run("hash", &ToolInput::text("hello"));
        assert!(!out.is_error);
        assert_eq!(out.content.len(), 64);
        assert_eq!(out.content, out.content.to_lowercase());
    }

    #[test]
    fn test_empty_input() {
        let out = widget().run("hash", &ToolInput::text(""));
        assert!(out.is_error);
        assert_eq!(out.content, "Please enter text to hash");
    }
}
