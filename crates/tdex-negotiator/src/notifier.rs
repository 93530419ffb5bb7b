//! User notification sink.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

/// Receives provider messages meant for the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

pub type DynNotifier = Arc<dyn Notifier>;

/// Notifier that writes messages to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        warn!(message, "Provider notice");
    }
}

/// Notifier that keeps every message, for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
