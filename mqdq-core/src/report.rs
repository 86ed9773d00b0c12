//! Leveled message reporting
//!
//! Components receive a [`Reporter`] explicitly instead of reaching for a
//! global logger, so they can run silently ([`NullReporter`]), forward to the
//! `log` facade ([`LogReporter`]) or keep messages for inspection
//! ([`CollectingReporter`]).

use log::Level;
use std::sync::Mutex;

/// Sink for diagnostic messages emitted while processing a document
pub trait Reporter: Send + Sync {
    /// Report a message at the given level
    fn report(&self, level: Level, message: &str);

    /// Report a tracing detail
    fn debug(&self, message: &str) {
        self.report(Level::Debug, message);
    }

    /// Report an informational message
    fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    /// Report a recoverable anomaly
    fn warn(&self, message: &str) {
        self.report(Level::Warn, message);
    }

    /// Report an error affecting a fragment, entry or element
    fn error(&self, message: &str) {
        self.report(Level::Error, message);
    }
}

/// Reporter discarding every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _level: Level, _message: &str) {}
}

/// Reporter forwarding messages to the `log` facade
#[derive(Debug, Clone)]
pub struct LogReporter {
    target: String,
}

impl LogReporter {
    /// Create a reporter logging under the given target
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Get the log target
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Default for LogReporter {
    fn default() -> Self {
        Self::new("mqdq")
    }
}

impl Reporter for LogReporter {
    fn report(&self, level: Level, message: &str) {
        log::log!(target: self.target.as_str(), level, "{}", message);
    }
}

/// A message kept by [`CollectingReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedMessage {
    pub level: Level,
    pub message: String,
}

/// Reporter keeping all the messages in memory
#[derive(Debug, Default)]
pub struct CollectingReporter {
    messages: Mutex<Vec<ReportedMessage>>,
}

impl CollectingReporter {
    /// Create an empty collecting reporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of all the messages reported so far
    pub fn messages(&self) -> Vec<ReportedMessage> {
        self.lock().clone()
    }

    /// Count the messages at the given level
    pub fn count(&self, level: Level) -> usize {
        self.lock().iter().filter(|m| m.level == level).count()
    }

    /// True if any message at the given level contains `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lock()
            .iter()
            .any(|m| m.level == level && m.message.contains(needle))
    }

    /// Remove all the messages
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ReportedMessage>> {
        // a poisoned lock still holds valid messages
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, level: Level, message: &str) {
        self.lock().push(ReportedMessage {
            level,
            message: message.to_string(),
        });
    }
}
