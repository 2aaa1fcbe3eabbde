//! Base64 encode/decode of UTF-8 text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{ToolInput, ToolOutput, ToolWidget};
use crate::catalog::ToolDescriptor;

pub struct Base64Codec {
    descriptor: ToolDescriptor,
}

impl Base64Codec {
    pub fn new(descriptor: ToolDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn encode(text: &str) -> ToolOutput {
        if text.is_empty() {
            return ToolOutput::error("Please enter text to encode");
        }
        ToolOutput::success(STANDARD.encode(text.as_bytes()))
    }

    pub fn decode(text: &str) -> ToolOutput {
        if text.is_empty() {
            return ToolOutput::error("Please enter text to decode");
        }
        STANDARD
            .decode(text.trim())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .map(ToolOutput::success)
            .unwrap_or_else(|| ToolOutput::error("Error: Invalid Base64 string"))
    }
}

impl ToolWidget for Base64Codec {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn actions(&self) -> &'static [&'static str] {
        &["encode", "decode"]
    }

    fn run(&mut self, action: &str, input: &ToolInput) -> ToolOutput {
        match action {
            "encode" => Self::encode(&input.text),
            "decode" => Self::decode(&input.text),
            _ => ToolOutput::unknown_action(&self.descriptor.name, action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_hello() {
        assert_eq!(Base64Codec::encode("hello").content, "aGVsbG8=");
    }

    #[test]
    fn test_decode_hello() {
        assert_eq!(Base64Codec::decode("aGVsbG8=").content, "hello");
    }

    #[test]
    fn test_unicode_text() {
        let encoded = Base64Codec::encode("héllo ✓").content;
        assert_eq!(Base64Codec::decode(&encoded).content, "héllo ✓");
    }

    #[test]
    fn test_decode_invalid() {
        let out = Base64Codec::decode("not-base64!");
        assert!(out.is_error);
        assert_eq!(out.content, "Error: Invalid Base64 string");
    }

    #[test]
    fn test_decode_non_utf8() {
        // 0xff 0xfe
        let out = Base64Codec::decode("//4=");
        assert!(out.is_error);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Base64Codec::encode("").content, "Please enter text to encode");
        assert_eq!(Base64Codec::decode("").content, "Please enter text to decode");
    }

    #[test]
    fn test_run_dispatch() {
        let mut w = Base64Codec::new(ToolDescriptor::new("base64-encoder", "Base64"));
        assert_eq!(w.run("encode", &ToolInput::text("hello")).content, "aGVsbG8=");
        assert!(w.run("rot13", &ToolInput::text("hello")).is_error);
    }
}
