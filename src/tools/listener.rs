//! Simulated queue/subscription listener.
//!
//! While listening, one timer task synthesizes a message every interval and
//! appends it to a bounded log shared with the widget.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use super::messaging::{MessagingForm, iso_now};
use super::{ToolInput, ToolOutput, ToolWidget};
use crate::catalog::ToolDescriptor;
use crate::id::{generate_lock_token, generate_message_id, now_ms};

const LOCK_DURATION_SECS: i64 = 60;

/// Timer period and log bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerSettings {
    pub interval: Duration,
    pub max_log_entries: usize,
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            max_log_entries: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageProperties {
    pub message_type: String,
    pub content_type: String,
    pub delivery_count: u32,
}

/// A synthesized message as a receiver would see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedMessage {
    pub message_id: String,
    pub queue_name: String,
    pub body: Value,
    pub properties: MessageProperties,
    pub enqueued_time_utc: String,
    pub sequence_number: u64,
    pub lock_token: String,
    pub expires_at_utc: String,
}

impl ReceivedMessage {
    /// Build a message of a random sample shape addressed to `queue_name`.
    pub fn synthesize(queue_name: &str) -> Self {
        let mut rng = rand::rng();
        let (message_type, body) = match rng.random_range(0..4) {
            0 => (
                "order",
                json!({
                    "orderId": format!("ORD-{}", now_ms()),
                    "amount": format!("{:.2}", rng.random::<f64>() * 1000.0),
                    "status": "pending",
                }),
            ),
            1 => (
                "notification",
                json!({
                    "title": "New Message",
                    "content": "You have a new notification",
                    "userId": format!("user-{}", rng.random_range(0..1000)),
                }),
            ),
            2 => (
                "event",
                json!({
                    "eventType": "user.login",
                    "userId": format!("user-{}", rng.random_range(0..1000)),
                    "timestamp": iso_now(),
                }),
            ),
            _ => (
                "telemetry",
                json!({
                    "deviceId": format!("device-{}", rng.random_range(0..100)),
                    "temperature": format!("{:.1}", 20.0 + rng.random::<f64>() * 10.0),
                    "humidity": format!("{:.0}", 50.0 + rng.random::<f64>() * 30.0),
                }),
            ),
        };

        let now = Utc::now();
        let expires = now + chrono::Duration::seconds(LOCK_DURATION_SECS);
        Self {
            message_id: generate_message_id(),
            queue_name: queue_name.to_string(),
            body,
            properties: MessageProperties {
                message_type: message_type.to_string(),
                content_type: "application/json".to_string(),
                delivery_count: 1,
            },
            enqueued_time_utc: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            sequence_number: now_ms(),
            lock_token: generate_lock_token(),
            expires_at_utc: expires.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// One line of the listener's display log.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    System(String),
    Message { number: usize, message: ReceivedMessage },
}

#[derive(Debug)]
struct ListenerLog {
    entries: VecDeque<LogEntry>,
    received: usize,
    max_entries: usize,
}

impl ListenerLog {
    fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            received: 0,
            max_entries: max_entries.max(1),
        }
    }

    fn push(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    fn push_message(&mut self, message: ReceivedMessage) {
        self.received += 1;
        let number = self.received;
        self.push(LogEntry::Message { number, message });
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.received = 0;
    }
}

fn lock(log: &Mutex<ListenerLog>) -> MutexGuard<'_, ListenerLog> {
    log.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct MessageListener {
    descriptor: ToolDescriptor,
    form: MessagingForm,
    settings: ListenerSettings,
    log: Arc<Mutex<ListenerLog>>,
    task: Option<JoinHandle<()>>,
}

impl MessageListener {
    pub fn new(descriptor: ToolDescriptor, form: MessagingForm, settings: ListenerSettings) -> Self {
        Self {
            descriptor,
            form,
            settings,
            log: Arc::new(Mutex::new(ListenerLog::new(settings.max_log_entries))),
            task: None,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.task.is_some()
    }

    /// Messages received since the last start.
    pub fn received_count(&self) -> usize {
        lock(&self.log).received
    }

    /// Snapshot of the display log, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        lock(&self.log).entries.iter().cloned().collect()
    }

    /// Messages currently held in the log.
    pub fn messages(&self) -> Vec<ReceivedMessage> {
        lock(&self.log)
            .entries
            .iter()
            .filter_map(|e| match e {
                LogEntry::Message { message, .. } => Some(message.clone()),
                LogEntry::System(_) => None,
            })
            .collect()
    }

    pub fn status(&self) -> &'static str {
        if self.is_listening() {
            "🟢 Connected - Listening for messages..."
        } else {
            "⚫ Disconnected - Stopped listening"
        }
    }

    fn start(&mut self, input: &ToolInput) -> ToolOutput {
        if self.is_listening() {
            return ToolOutput::error("Already listening. Stop the listener before starting again.");
        }

        let (connection_string, queue_name) = self.form.resolve(input);
        if connection_string.is_empty() || queue_name.is_empty() {
            return ToolOutput::error("Please provide connection string and queue/topic name");
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return ToolOutput::error("Listener needs an async runtime to run its timer");
        };

        {
            let mut log = lock(&self.log);
            log.reset();
            log.push(LogEntry::System(start_note(&queue_name, self.settings.interval)));
        }

        let period = self.settings.interval;
        let log = Arc::clone(&self.log);
        let queue = queue_name.clone();
        self.task = Some(runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let message = ReceivedMessage::synthesize(&queue);
                debug!("Simulated message {} on {}", message.message_id, queue);
                lock(&log).push_message(message);
            }
        }));

        info!("Listener started for {}", queue_name);
        ToolOutput::success(format!("Status: {}\n\nListener started for: {}", self.status(), queue_name))
    }

    fn stop(&mut self) -> ToolOutput {
        let Some(task) = self.task.take() else {
            return ToolOutput::error("Listener is not running");
        };
        task.abort();

        let total = {
            let mut log = lock(&self.log);
            let total = log.received;
            log.push(LogEntry::System(stop_note(total)));
            total
        };

        info!("Listener stopped after {} message(s)", total);
        ToolOutput::success(format!("Status: {}\n\nTotal messages received: {}", self.status(), total))
    }

    fn clear(&mut self) -> ToolOutput {
        let mut log = lock(&self.log);
        log.entries.clear();
        ToolOutput::success("Messages cleared.")
    }

    /// Display text of the log.
    pub fn render_log(&self) -> String {
        let log = lock(&self.log);
        if log.entries.is_empty() {
            return "No messages yet.".to_string();
        }
        log.entries
            .iter()
            .map(|entry| match entry {
                LogEntry::System(text) => format!("ℹ️  {}", text),
                LogEntry::Message { number, message } => {
                    let body = serde_json::to_string_pretty(&message.body).unwrap_or_default();
                    format!(
                        "📨 Message #{} - {} ✓ CONSUMED\n{}\nType: {} | ID: {} | Lock: {}",
                        number,
                        message.enqueued_time_utc,
                        body,
                        message.properties.message_type,
                        message.message_id,
                        message.lock_token
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn halt(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn start_note(queue_name: &str, period: Duration) -> String {
    let mode = if queue_name.contains("topic") || queue_name.contains("subscription") {
        "📢 TOPIC MODE:\n\
         • Messages sent to topic are copied to all subscriptions\n\
         • Each subscription processes messages independently\n\
         • Same message can be read by multiple subscribers\n\
         • Message is consumed (deleted) after successful processing per subscription\n"
    } else {
        "📫 QUEUE MODE:\n\
         • Messages are consumed (deleted) after reading\n\
         • One message → One consumer\n\
         • FIFO order guaranteed\n\
         • Peek-lock pattern: Lock → Process → Complete/Abandon\n"
    };
    format!(
        "Listener started for: {}\n\n{}\nDemo mode: Simulating new messages every {} seconds...",
        queue_name,
        mode,
        period.as_secs_f64()
    )
}

fn stop_note(total: usize) -> String {
    format!(
        "Listener stopped.\n\n📊 Session Summary:\n\
         • Total messages received: {}\n\
         • All messages consumed successfully\n\
         • No messages left in queue (demo mode)",
        total
    )
}

impl ToolWidget for MessageListener {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn actions(&self) -> &'static [&'static str] {
        &[
            "save-config",
            "load-history",
            "use-history",
            "clear-config",
            "start",
            "stop",
            "status",
            "messages",
            "clear",
        ]
    }

    fn run(&mut self, action: &str, input: &ToolInput) -> ToolOutput {
        if let Some(out) = self.form.run(action, input) {
            return out;
        }
        match action {
            "start" => self.start(input),
            "stop" => self.stop(),
            "status" => ToolOutput::success(format!(
                "Status: {}\nMessages received: {}",
                self.status(),
                self.received_count()
            )),
            "messages" => ToolOutput::success(self.render_log()),
            "clear" => self.clear(),
            _ => ToolOutput::unknown_action(&self.descriptor.name, action),
        }
    }

    fn on_close(&mut self) {
        if self.is_listening() {
            self.stop();
        }
    }
}

impl Drop for MessageListener {
    fn drop(&mut self) {
        self.halt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvironmentRegistry;
    use crate::storage::{MemoryStore, SharedStore, ToolConfigStore};

    fn widget(settings: ListenerSettings) -> MessageListener {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let form = MessagingForm::new(
            "servicebus-listener",
            ToolConfigStore::new(store.clone()),
            EnvironmentRegistry::new(store),
        );
        MessageListener::new(ToolDescriptor::new("servicebus-listener", "Listener"), form, settings)
    }

    fn start_input(queue: &str) -> ToolInput {
        ToolInput::new()
            .with_option("connectionString", "Endpoint=sb://x/")
            .with_option("queueName", queue)
    }

    #[test]
    fn test_synthesized_message_shape() {
        let message = ReceivedMessage::synthesize("orders");
        assert!(message.message_id.starts_with("msg-"));
        assert!(message.lock_token.starts_with("lock-"));
        assert_eq!(message.queue_name, "orders");
        assert_eq!(message.properties.content_type, "application/json");
        assert_eq!(message.properties.delivery_count, 1);
        assert!(["order", "notification", "event", "telemetry"].contains(&message.properties.message_type.as_str()));

        let enqueued = chrono::DateTime::parse_from_rfc3339(&message.enqueued_time_utc).unwrap();
        let expires = chrono::DateTime::parse_from_rfc3339(&message.expires_at_utc).unwrap();
        assert_eq!((expires - enqueued).num_seconds(), 60);
    }

    #[test]
    fn test_log_is_capped() {
        let mut log = ListenerLog::new(3);
        for _ in 0..5 {
            log.push_message(ReceivedMessage::synthesize("q"));
        }
        assert_eq!(log.entries.len(), 3);
        assert_eq!(log.received, 5);
        assert!(matches!(log.entries.front(), Some(LogEntry::Message { number: 3, .. })));
    }

    #[test]
    fn test_start_requires_fields() {
        let mut w = widget(ListenerSettings::default());
        let out = w.run("start", &ToolInput::new());
        assert!(out.is_error);
        assert!(!w.is_listening());
    }

    #[test]
    fn test_start_without_runtime() {
        let mut w = widget(ListenerSettings::default());
        let out = w.run("start", &start_input("orders"));
        assert!(out.is_error);
        assert!(!w.is_listening());
    }

    #[test]
    fn test_stop_when_idle() {
        let mut w = widget(ListenerSettings::default());
        assert!(w.run("stop", &ToolInput::new()).is_error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_intervals_three_messages() {
        let mut w = widget(ListenerSettings::default());
        assert!(!w.run("start", &start_input("orders")).is_error);

        tokio::time::sleep(Duration::from_millis(5000 * 3 + 100)).await;
        let out = w.run("stop", &ToolInput::new());
        assert!(out.content.contains("Total messages received: 3"));
        assert_eq!(w.messages().len(), 3);

        tokio::time::sleep(Duration::from_millis(20_000)).await;
        assert_eq!(w.messages().len(), 3);
        assert!(!w.is_listening());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_message_before_first_interval() {
        let mut w = widget(ListenerSettings::default());
        w.run("start", &start_input("orders"));
        tokio::time::sleep(Duration::from_millis(4900)).await;
        assert_eq!(w.received_count(), 0);
        w.run("stop", &ToolInput::new());
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_rejected() {
        let mut w = widget(ListenerSettings::default());
        assert!(!w.run("start", &start_input("orders")).is_error);
        let second = w.run("start", &start_input("orders"));
        assert!(second.is_error);
        assert!(w.is_listening());
        w.run("stop", &ToolInput::new());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_notes_mode() {
        let mut w = widget(ListenerSettings::default());
        w.run("start", &start_input("billing-topic"));
        let entries = w.entries();
        assert!(matches!(&entries[0], LogEntry::System(text) if text.contains("TOPIC MODE")));
        w.run("stop", &ToolInput::new());

        w.run("start", &start_input("orders"));
        assert!(matches!(&w.entries()[0], LogEntry::System(text) if text.contains("QUEUE MODE")));
        w.on_close();
        assert!(!w.is_listening());
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_close_stops_timer() {
        let mut w = widget(ListenerSettings {
            interval: Duration::from_millis(100),
            max_log_entries: 100,
        });
        w.run("start", &start_input("orders"));
        tokio::time::sleep(Duration::from_millis(250)).await;
        w.on_close();
        let count = w.received_count();
        assert_eq!(count, 2);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(w.received_count(), count);
    }

    #[tokio::test(start_paused = true)]
    async fn test_log_cap_while_listening() {
        let mut w = widget(ListenerSettings {
            interval: Duration::from_millis(10),
            max_log_entries: 5,
        });
        w.run("start", &start_input("orders"));
        tokio::time::sleep(Duration::from_millis(105)).await;
        w.run("stop", &ToolInput::new());
        assert_eq!(w.entries().len(), 5);
        assert_eq!(w.received_count(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_messages_render_and_clear() {
        let mut w = widget(ListenerSettings {
            interval: Duration::from_millis(10),
            max_log_entries: 100,
        });
        w.run("start", &start_input("orders"));
        tokio::time::sleep(Duration::from_millis(15)).await;
        let out = w.run("messages", &ToolInput::new());
        assert!(out.content.contains("📨 Message #1"));
        w.run("stop", &ToolInput::new());
        w.run("clear", &ToolInput::new());
        assert!(w.entries().is_empty());
    }
}
