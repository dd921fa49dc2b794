//! User-facing notifications

use std::sync::Mutex;

use colored::Colorize;
use tracing::{error, info};

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

/// A notification shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Sink for success/error toasts
pub trait Notifier: Send + Sync {
    fn notify(&self, level: Level, message: &str);

    fn success(&self, message: &str) {
        self.notify(Level::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(Level::Error, message);
    }
}

/// Prints notifications to stderr
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, level: Level, message: &str) {
        match level {
            Level::Success => {
                info!("{}", message);
                eprintln!("{} {}", "✔".green(), message);
            }
            Level::Error => {
                error!("{}", message);
                eprintln!("{} {}", "✖".red(), message.red());
            }
        }
    }
}

/// Keeps notifications in memory. Used by the watch screen to show the
/// latest toast.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    entries: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clone()
    }

    pub fn latest(&self) -> Option<Notification> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.last().cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, level: Level, message: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(Notification {
            level,
            message: message.to_string(),
        });
    }
}
