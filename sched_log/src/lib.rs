//! # Scheduler Event Log
//!
//! This crate implements the kernel-style event log and structured logging.
//!
//! ## Philosophy
//!
//! Logging is explicit and structured, not text-based or printf-style.
//! The engine appends [`SchedulerEvent`] records and never prints; hosts
//! turn them into [`LogEntry`] values and decide what to show.

pub mod event;

pub use event::{EventKind, EventLog, SchedulerEvent};

use sched_types::{CoreId, ProcessId, Tick};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

impl LogLevel {
    /// Parses a level name, case-insensitive
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// A structured log entry
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Simulated time the entry refers to
    pub tick: Tick,
    /// Source process (if known)
    pub source: Option<ProcessId>,
    /// Log message
    pub message: String,
    /// Structured fields
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Creates a new log entry
    pub fn new(level: LogLevel, tick: Tick, message: String) -> Self {
        Self {
            level,
            tick,
            source: None,
            message,
            fields: Vec::new(),
        }
    }

    /// Sets the source process
    pub fn with_source(mut self, source: ProcessId) -> Self {
        self.source = Some(source);
        self
    }

    /// Adds a field to the log entry
    pub fn with_field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    /// Adds a `core` field
    pub fn with_core(self, core: CoreId) -> Self {
        self.with_field("core", core.index())
    }

    /// Looks up a field value by key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse(" debug "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn test_log_entry_creation() {
        let entry = LogEntry::new(LogLevel::Info, 3, "test message".to_string());
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.tick, 3);
        assert_eq!(entry.message, "test message");
        assert!(entry.source.is_none());
        assert!(entry.fields.is_empty());
    }

    #[test]
    fn test_log_entry_with_source() {
        let id = ProcessId::new(4);
        let entry = LogEntry::new(LogLevel::Info, 0, "test".to_string()).with_source(id);
        assert_eq!(entry.source, Some(id));
    }

    #[test]
    fn test_log_entry_with_fields() {
        let entry = LogEntry::new(LogLevel::Info, 0, "test".to_string())
            .with_field("key1", "value1")
            .with_core(CoreId(2));

        assert_eq!(entry.fields.len(), 2);
        assert_eq!(entry.field("key1"), Some("value1"));
        assert_eq!(entry.field("core"), Some("2"));
        assert_eq!(entry.field("missing"), None);
    }
}
