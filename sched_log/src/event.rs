//! Append-only scheduling event log

use crate::{LogEntry, LogLevel};
use sched_types::{CoreId, ProcessId, Tick};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Kind of scheduling event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Arrival,
    Start,
    Preempt,
    Complete,
    IoStart,
    IoComplete,
    ContextSwitch,
    AgingBoost,
    Demotion,
    LoadBalance,
}

impl EventKind {
    /// Severity used when rendering the event as a log entry
    pub fn level(&self) -> LogLevel {
        match self {
            EventKind::LoadBalance | EventKind::IoStart | EventKind::IoComplete => LogLevel::Debug,
            EventKind::Arrival
            | EventKind::Start
            | EventKind::ContextSwitch
            | EventKind::Preempt
            | EventKind::Demotion
            | EventKind::Complete => LogLevel::Info,
            EventKind::AgingBoost => LogLevel::Warn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Arrival => "arrival",
            EventKind::Start => "start",
            EventKind::Preempt => "preempt",
            EventKind::Complete => "complete",
            EventKind::IoStart => "io-start",
            EventKind::IoComplete => "io-complete",
            EventKind::ContextSwitch => "context-switch",
            EventKind::AgingBoost => "aging-boost",
            EventKind::Demotion => "demotion",
            EventKind::LoadBalance => "load-balance",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable scheduling event record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerEvent {
    pub tick: Tick,
    pub kind: EventKind,
    pub message: String,
    pub process: Option<ProcessId>,
    pub core: Option<CoreId>,
}

impl SchedulerEvent {
    pub fn new(tick: Tick, kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            message: message.into(),
            process: None,
            core: None,
        }
    }

    pub fn with_process(mut self, process: ProcessId) -> Self {
        self.process = Some(process);
        self
    }

    pub fn with_core(mut self, core: CoreId) -> Self {
        self.core = Some(core);
        self
    }

    /// Converts the event into a structured log entry
    pub fn to_log_entry(&self) -> LogEntry {
        let mut entry = LogEntry::new(self.kind.level(), self.tick, self.message.clone())
            .with_field("kind", self.kind);
        if let Some(process) = self.process {
            entry = entry.with_source(process).with_field("process", process);
        }
        if let Some(core) = self.core {
            entry = entry.with_core(core);
        }
        entry
    }

    /// Canonical one-line encoding used for fingerprinting
    fn canonical_line(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}\n",
            self.tick,
            self.kind.as_str(),
            self.process.map(|p| p.to_string()).unwrap_or_default(),
            self.core.map(|c| c.index().to_string()).unwrap_or_default(),
            self.message
        )
    }
}

/// Append-only log of scheduling events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<SchedulerEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Appends one event
    pub fn push(&mut self, event: SchedulerEvent) {
        self.events.push(event);
    }

    /// Appends a batch of events, preserving their order
    pub fn extend(&mut self, events: impl IntoIterator<Item = SchedulerEvent>) {
        self.events.extend(events);
    }

    pub fn events(&self) -> &[SchedulerEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events of one kind, in log order
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &SchedulerEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// Events referring to one process, in log order
    pub fn for_process(&self, process: ProcessId) -> impl Iterator<Item = &SchedulerEvent> {
        self.events
            .iter()
            .filter(move |e| e.process == Some(process))
    }

    /// Events stamped at a given tick
    pub fn at_tick(&self, tick: Tick) -> impl Iterator<Item = &SchedulerEvent> {
        self.events.iter().filter(move |e| e.tick == tick)
    }

    /// Structured entries at or above `min_level`
    pub fn entries(&self, min_level: LogLevel) -> Vec<LogEntry> {
        self.events
            .iter()
            .filter(|e| e.kind.level() >= min_level)
            .map(SchedulerEvent::to_log_entry)
            .collect()
    }

    /// Hex SHA-256 over the canonical encoding of every event
    ///
    /// Two runs produce the same fingerprint exactly when their logs match.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for event in &self.events {
            hasher.update(event.canonical_line().as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EventLog {
        let mut log = EventLog::new();
        log.push(
            SchedulerEvent::new(0, EventKind::Arrival, "P1 arrived").with_process(ProcessId::new(1)),
        );
        log.push(
            SchedulerEvent::new(0, EventKind::Start, "P1 started on Core 0")
                .with_process(ProcessId::new(1))
                .with_core(CoreId(0)),
        );
        log.push(
            SchedulerEvent::new(3, EventKind::IoStart, "P1 starting I/O operation (2 units)")
                .with_process(ProcessId::new(1))
                .with_core(CoreId(0)),
        );
        log
    }

    #[test]
    fn test_append_preserves_order() {
        let log = sample();
        assert_eq!(log.len(), 3);
        assert_eq!(log.events()[0].kind, EventKind::Arrival);
        assert_eq!(log.events()[2].kind, EventKind::IoStart);
    }

    #[test]
    fn test_filters() {
        let log = sample();
        assert_eq!(log.of_kind(EventKind::Start).count(), 1);
        assert_eq!(log.for_process(ProcessId::new(1)).count(), 3);
        assert_eq!(log.for_process(ProcessId::new(2)).count(), 0);
        assert_eq!(log.at_tick(0).count(), 2);
    }

    #[test]
    fn test_entries_respect_level() {
        let log = sample();
        assert_eq!(log.entries(LogLevel::Debug).len(), 3);
        // io-start is debug-level
        assert_eq!(log.entries(LogLevel::Info).len(), 2);
        assert!(log.entries(LogLevel::Warn).is_empty());
    }

    #[test]
    fn test_to_log_entry_fields() {
        let entry = sample().events()[1].to_log_entry();
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.source, Some(ProcessId::new(1)));
        assert_eq!(entry.field("kind"), Some("start"));
        assert_eq!(entry.field("process"), Some("P1"));
        assert_eq!(entry.field("core"), Some("0"));
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let a = sample();
        let b = sample();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let mut c = sample();
        c.push(SchedulerEvent::new(5, EventKind::Complete, "P1 completed execution"));
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_event_serializes() {
        let json = serde_json::to_string(&sample().events()[0]).unwrap();
        assert!(json.contains("\"kind\":\"arrival\""));
    }
}
