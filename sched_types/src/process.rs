//! Simulated process entity

use crate::burst::{parse_burst_pattern, total_duration, Burst, BurstPatternError};
use crate::ids::{CoreId, ProcessId};
use crate::Tick;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lifecycle state of a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
    /// Configured but not yet arrived
    New,
    /// Waiting in a core's ready queue
    Ready,
    /// Occupying a core
    Running,
    /// Performing an I/O burst
    Waiting,
    /// Every burst has been served
    Terminated,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessState::New => "NEW",
            ProcessState::Ready => "READY",
            ProcessState::Running => "RUNNING",
            ProcessState::Waiting => "WAITING",
            ProcessState::Terminated => "TERMINATED",
        };
        write!(f, "{}", name)
    }
}

/// Input validation error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Process name is required")]
    EmptyName,

    #[error("Process {0} has an empty burst sequence")]
    EmptyBurstSequence(String),

    #[error("Process {name} has a zero-duration burst at position {index}")]
    ZeroDurationBurst { name: String, index: usize },

    #[error("Process {name} arrives at {arrival_time}, before the current clock {clock}")]
    ArrivalInPast {
        name: String,
        arrival_time: Tick,
        clock: Tick,
    },
}

/// User-supplied process definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub name: String,
    pub arrival_time: Tick,
    /// Lower value = more urgent
    pub priority: u32,
    pub bursts: Vec<Burst>,
}

impl ProcessSpec {
    pub fn new(name: impl Into<String>, arrival_time: Tick, priority: u32, bursts: Vec<Burst>) -> Self {
        Self {
            name: name.into(),
            arrival_time,
            priority,
            bursts,
        }
    }

    /// Builds a spec from burst pattern notation
    pub fn from_pattern(
        name: impl Into<String>,
        arrival_time: Tick,
        priority: u32,
        pattern: &str,
    ) -> Result<Self, BurstPatternError> {
        Ok(Self::new(name, arrival_time, priority, parse_burst_pattern(pattern)?))
    }

    /// Checks the definition independently of any simulation state
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.bursts.is_empty() {
            return Err(ValidationError::EmptyBurstSequence(name.to_string()));
        }
        if let Some(index) = self.bursts.iter().position(|b| b.duration == 0) {
            return Err(ValidationError::ZeroDurationBurst {
                name: name.to_string(),
                index,
            });
        }
        Ok(())
    }
}

/// A simulated process
///
/// Static attributes come from the [`ProcessSpec`]; everything else is
/// owned and advanced by the tick engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    pub color: String,
    pub arrival_time: Tick,
    /// Current priority (aging may lower it)
    pub priority: u32,
    /// Priority as configured, restored on rewind
    pub base_priority: u32,
    pub bursts: Vec<Burst>,

    pub state: ProcessState,
    /// Index of the active burst; equals `bursts.len()` once terminated
    pub current_burst_index: usize,
    pub wait_time: u64,
    pub turnaround_time: u64,
    pub response_time: Option<u64>,
    pub start_time: Option<Tick>,
    pub completion_time: Option<Tick>,
    /// Clock value at which the process last entered READY
    pub waiting_since: Option<Tick>,
    /// MLFQ level, 0 is the most urgent
    pub queue_level: usize,
    /// Core chosen at arrival, fixed for the lifetime of the process
    pub assigned_core: Option<CoreId>,
}

impl Process {
    /// Creates a NEW process from a validated spec
    pub fn from_spec(id: ProcessId, color: impl Into<String>, spec: ProcessSpec) -> Self {
        let name = spec.name.trim().to_string();
        Self {
            id,
            name,
            color: color.into(),
            arrival_time: spec.arrival_time,
            priority: spec.priority,
            base_priority: spec.priority,
            bursts: spec.bursts,
            state: ProcessState::New,
            current_burst_index: 0,
            wait_time: 0,
            turnaround_time: 0,
            response_time: None,
            start_time: None,
            completion_time: None,
            waiting_since: None,
            queue_level: 0,
            assigned_core: None,
        }
    }

    /// Returns the active burst, if any remain
    pub fn current_burst(&self) -> Option<&Burst> {
        self.bursts.get(self.current_burst_index)
    }

    pub fn current_burst_mut(&mut self) -> Option<&mut Burst> {
        self.bursts.get_mut(self.current_burst_index)
    }

    /// Remaining time of the active burst
    pub fn remaining_in_current_burst(&self) -> Option<u32> {
        self.current_burst().map(|b| b.remaining)
    }

    /// Sum of every burst duration (total service time)
    pub fn total_burst_time(&self) -> u64 {
        total_duration(&self.bursts)
    }

    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    /// Continuous time spent READY since the last reference point
    pub fn wait_duration(&self, clock: Tick) -> Option<u64> {
        self.waiting_since.map(|since| clock.saturating_sub(since))
    }

    /// Moves to the next burst
    ///
    /// Returns the new active burst, or `None` if the sequence is exhausted.
    pub fn advance_burst(&mut self) -> Option<&Burst> {
        if self.current_burst_index < self.bursts.len() {
            self.current_burst_index += 1;
        }
        self.bursts.get(self.current_burst_index)
    }

    /// Records completion at `clock`
    ///
    /// Turnaround and waiting time are derived exactly from the completion
    /// time rather than from the running counter.
    pub fn terminate(&mut self, clock: Tick) {
        self.state = ProcessState::Terminated;
        self.current_burst_index = self.bursts.len();
        self.completion_time = Some(clock);
        self.turnaround_time = clock.saturating_sub(self.arrival_time);
        self.wait_time = self.turnaround_time.saturating_sub(self.total_burst_time());
        self.waiting_since = None;
    }

    /// Restores the process to its configured, not-yet-arrived form
    pub fn rewind(&mut self) {
        for burst in &mut self.bursts {
            burst.restore();
        }
        self.priority = self.base_priority;
        self.state = ProcessState::New;
        self.current_burst_index = 0;
        self.wait_time = 0;
        self.turnaround_time = 0;
        self.response_time = None;
        self.start_time = None;
        self.completion_time = None;
        self.waiting_since = None;
        self.queue_level = 0;
        self.assigned_core = None;
    }

    /// Returns the definition this process was built from
    pub fn spec(&self) -> ProcessSpec {
        let mut bursts = self.bursts.clone();
        for burst in &mut bursts {
            burst.restore();
        }
        ProcessSpec::new(self.name.clone(), self.arrival_time, self.base_priority, bursts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::burst::BurstKind;

    fn spec() -> ProcessSpec {
        ProcessSpec::from_pattern("P1", 2, 3, "CPU(3) -> IO(2) -> CPU(1)").unwrap()
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(spec().validate(), Ok(()));
    }

    #[test]
    fn test_validate_empty_name() {
        let mut s = spec();
        s.name = "   ".to_string();
        assert_eq!(s.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_validate_empty_bursts() {
        let s = ProcessSpec::new("A", 0, 1, vec![]);
        assert_eq!(
            s.validate(),
            Err(ValidationError::EmptyBurstSequence("A".to_string()))
        );
    }

    #[test]
    fn test_validate_zero_duration() {
        let s = ProcessSpec::new("A", 0, 1, vec![Burst::cpu(2), Burst::io(0)]);
        assert_eq!(
            s.validate(),
            Err(ValidationError::ZeroDurationBurst {
                name: "A".to_string(),
                index: 1
            })
        );
    }

    #[test]
    fn test_new_process_defaults() {
        let p = Process::from_spec(ProcessId::new(1), "#FF6B6B", spec());
        assert_eq!(p.state, ProcessState::New);
        assert_eq!(p.current_burst_index, 0);
        assert_eq!(p.queue_level, 0);
        assert_eq!(p.assigned_core, None);
        assert_eq!(p.total_burst_time(), 6);
        assert_eq!(p.remaining_in_current_burst(), Some(3));
    }

    #[test]
    fn test_advance_burst_sequence() {
        let mut p = Process::from_spec(ProcessId::new(1), "#FF6B6B", spec());
        assert_eq!(p.advance_burst().map(|b| b.kind), Some(BurstKind::Io));
        assert_eq!(p.advance_burst().map(|b| b.kind), Some(BurstKind::Cpu));
        assert!(p.advance_burst().is_none());
        assert_eq!(p.current_burst_index, 3);
        // Never moves past the end
        assert!(p.advance_burst().is_none());
        assert_eq!(p.current_burst_index, 3);
    }

    #[test]
    fn test_terminate_derives_times() {
        let mut p = Process::from_spec(ProcessId::new(1), "#FF6B6B", spec());
        p.terminate(14);
        assert_eq!(p.completion_time, Some(14));
        assert_eq!(p.turnaround_time, 12);
        assert_eq!(p.wait_time, 6);
        assert_eq!(p.current_burst_index, p.bursts.len());
        assert!(p.is_terminated());
    }

    #[test]
    fn test_rewind_restores_spec() {
        let mut p = Process::from_spec(ProcessId::new(1), "#FF6B6B", spec());
        p.bursts[0].remaining = 0;
        p.priority = 0;
        p.terminate(20);
        p.rewind();
        assert_eq!(p.state, ProcessState::New);
        assert_eq!(p.priority, 3);
        assert_eq!(p.bursts[0].remaining, 3);
        assert_eq!(p.spec(), spec());
    }
}
