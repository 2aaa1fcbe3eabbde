//! Simulated queue/topic message sender.

use log::info;
use serde_json::Value;

use super::messaging::{MessagingForm, SendRecord, iso_now};
use super::{ToolInput, ToolOutput, ToolWidget};
use crate::catalog::ToolDescriptor;
use crate::id::generate_message_id;

pub const SIMULATED_STATUS: &str = "Simulated (Ready for Integration)";

pub struct MessageSender {
    descriptor: ToolDescriptor,
    form: MessagingForm,
    sent: Vec<SendRecord>,
}

impl MessageSender {
    pub fn new(descriptor: ToolDescriptor, form: MessagingForm) -> Self {
        Self {
            descriptor,
            form,
            sent: Vec::new(),
        }
    }

    /// Messages sent since the widget opened.
    pub fn sent(&self) -> &[SendRecord] {
        &self.sent
    }

    fn send(&mut self, input: &ToolInput) -> ToolOutput {
        let (connection_string, queue_name) = self.form.resolve(input);
        let body = input.text.trim();

        if connection_string.is_empty() || queue_name.is_empty() || body.is_empty() {
            return ToolOutput::error("Please provide connection string, queue name, and message body");
        }

        let properties_raw = input.secondary.trim();
        let properties = if properties_raw.is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str::<Value>(properties_raw) {
                Ok(v) => v,
                Err(_) => return ToolOutput::error("Invalid JSON in custom properties"),
            }
        };

        let record = SendRecord {
            queue_name,
            message_id: generate_message_id(),
            body: body.to_string(),
            properties,
            timestamp: iso_now(),
            status: SIMULATED_STATUS.to_string(),
        };

        let details = match serde_json::to_string_pretty(&record) {
            Ok(json) => json,
            Err(e) => return ToolOutput::error(format!("Error: {}", e)),
        };
        info!("Simulated send of {} to {}", record.message_id, record.queue_name);
        self.sent.push(record);

        ToolOutput::success(format!(
            "✓ Message simulated successfully!\n\nNo message left this machine: sending is simulated.\n\nMessage Details:\n{}",
            details
        ))
    }
}

impl ToolWidget for MessageSender {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn actions(&self) -> &'static [&'static str] {
        &["save-config", "load-history", "use-history", "clear-config", "send"]
    }

    fn run(&mut self, action: &str, input: &ToolInput) -> ToolOutput {
        if let Some(out) = self.form.run(action, input) {
            return out;
        }
        match action {
            "send" => self.send(input),
            _ => ToolOutput::unknown_action(&self.descriptor.name, action),
        }
    }
}
