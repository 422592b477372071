use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};

const MAX_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

/// User-visible event log shown on the admin page. Oldest entries fall off.
pub struct ActivityLog {
    entries: Mutex<VecDeque<LogEntry>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(MAX_ENTRIES)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_entry(&self, level: &str, source: &str, message: &str) -> LogEntry {
        match level {
            "ERROR" => error!(source, "{}", message),
            "WARN" => warn!(source, "{}", message),
            _ => info!(source, "{}", message),
        }

        let entry = LogEntry {
            time: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            level: level.to_string(),
            source: source.to_string(),
            message: message.to_string(),
        };
        let mut entries = self.entries();
        entries.push_back(entry.clone());
        while entries.len() > MAX_ENTRIES {
            entries.pop_front();
        }
        entry
    }

    pub fn info(&self, source: &str, message: &str) {
        self.add_entry("INFO", source, message);
    }

    pub fn warn(&self, source: &str, message: &str) {
        self.add_entry("WARN", source, message);
    }

    pub fn error(&self, source: &str, message: &str) {
        self.add_entry("ERROR", source, message);
    }

    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}
