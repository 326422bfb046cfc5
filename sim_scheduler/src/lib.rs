//! # Scheduling Simulator
//!
//! This crate provides a discrete-time CPU scheduling simulator.
//!
//! ## Purpose
//!
//! The simulator lets a learner watch scheduling policies at work:
//! - One or more cores, each with its own ready queue and Gantt history
//! - A shared I/O device that every waiting process uses concurrently
//! - Seven selection policies, from FCFS to MLFQ
//! - Optional priority aging
//! - Aggregate metrics recomputed after every tick
//!
//! ## Philosophy
//!
//! **Testability is a first-class design constraint.**
//!
//! Time only moves when [`Simulator::step`] or [`Simulator::tick`] is
//! called. There is no timer, no thread and no randomness inside the
//! engine, so the same workload under the same configuration always
//! produces the same event log.
//!
//! All state is directly inspectable, and [`Simulator::snapshot`] hands out
//! an owned, serializable copy for hosts that render it.

pub mod aging;
pub mod balancer;
pub mod clock;
pub mod config;
pub mod cpu_core;
pub mod engine;
pub mod error;
pub mod io_device;
pub mod metrics;
pub mod policy;
pub mod test_utils;

pub use config::{RunState, SimConfig, MAX_CORES, MAX_MLFQ_LEVELS};
pub use cpu_core::{CpuCore, GanttSegment};
pub use engine::SimState;
pub use error::SimError;
pub use io_device::IoDevice;
pub use metrics::Metrics;
pub use policy::{Decision, PreemptReason};

use sched_log::{EventLog, SchedulerEvent};
use sched_types::{
    next_color, Algorithm, Process, ProcessId, ProcessIdAllocator, ProcessSpec, ProcessState,
    Tick, ValidationError,
};
use serde::{Deserialize, Serialize};

/// Owned, serializable view of the whole simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub config: SimConfig,
    pub run_state: RunState,
    pub clock: Tick,
    pub processes: Vec<Process>,
    pub cores: Vec<CpuCore>,
    pub io_queue: Vec<ProcessId>,
    pub events: Vec<SchedulerEvent>,
    pub metrics: Metrics,
}

/// The simulator
///
/// Owns the configuration, the run state and the current [`SimState`].
/// Every mutating call either succeeds completely or returns an error and
/// leaves the simulation untouched.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimConfig,
    run_state: RunState,
    state: SimState,
    ids: ProcessIdAllocator,
}

impl Simulator {
    /// Creates a simulator with the default configuration
    pub fn new() -> Self {
        let config = SimConfig::default();
        Self {
            state: SimState::new(config.core_count),
            config,
            run_state: RunState::Stopped,
            ids: ProcessIdAllocator::new(),
        }
    }

    /// Creates a simulator with a validated configuration
    pub fn with_config(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            state: SimState::new(config.core_count),
            config,
            run_state: RunState::Stopped,
            ids: ProcessIdAllocator::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn clock(&self) -> Tick {
        self.state.now()
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn processes(&self) -> &[Process] {
        &self.state.processes
    }

    pub fn process(&self, id: ProcessId) -> Option<&Process> {
        self.state.process(id)
    }

    /// Looks a process up by its display name
    pub fn process_by_name(&self, name: &str) -> Option<&Process> {
        self.state.processes.iter().find(|p| p.name == name)
    }

    pub fn cores(&self) -> &[CpuCore] {
        &self.state.cores
    }

    pub fn io_device(&self) -> &IoDevice {
        &self.state.io_device
    }

    pub fn events(&self) -> &EventLog {
        &self.state.events
    }

    pub fn metrics(&self) -> &Metrics {
        &self.state.metrics
    }

    /// True once every process has terminated
    pub fn is_finished(&self) -> bool {
        self.state.all_terminated()
    }

    /// Replaces the configuration
    ///
    /// Rejected while running. The core count and the number of MLFQ
    /// levels can only change before the first tick: processes are bound to
    /// their core for life and carry their queue level across ticks.
    pub fn configure(&mut self, config: SimConfig) -> Result<(), SimError> {
        if self.run_state == RunState::Running {
            return Err(SimError::SimulationRunning);
        }
        config.validate()?;
        if config.mlfq_levels != self.config.mlfq_levels && self.state.clock.has_started() {
            return Err(SimError::MlfqLevelsLocked);
        }
        if config.core_count != self.config.core_count {
            if self.state.clock.has_started() {
                return Err(SimError::CoreCountLocked);
            }
            self.state.cores = SimState::new(config.core_count).cores;
        }
        self.config = config;
        Ok(())
    }

    /// Switches the selection policy, keeping everything else
    pub fn set_algorithm(&mut self, algorithm: Algorithm) -> Result<(), SimError> {
        self.configure(SimConfig {
            algorithm,
            ..self.config.clone()
        })
    }

    /// Adds a NEW process
    pub fn add_process(&mut self, spec: ProcessSpec) -> Result<ProcessId, SimError> {
        if self.run_state == RunState::Running {
            return Err(SimError::SimulationRunning);
        }
        self.check_spec(&spec)?;
        Ok(self.insert(spec))
    }

    /// Adds a NEW process described in burst pattern notation
    pub fn add_process_from_pattern(
        &mut self,
        name: &str,
        arrival_time: Tick,
        priority: u32,
        pattern: &str,
    ) -> Result<ProcessId, SimError> {
        let spec = ProcessSpec::from_pattern(name, arrival_time, priority, pattern)?;
        self.add_process(spec)
    }

    /// Removes a process that has not arrived yet
    pub fn remove_process(&mut self, id: ProcessId) -> Result<Process, SimError> {
        if self.run_state == RunState::Running {
            return Err(SimError::SimulationRunning);
        }
        let index = self
            .state
            .processes
            .iter()
            .position(|p| p.id == id)
            .ok_or(SimError::ProcessNotFound(id))?;
        if self.state.processes[index].state != ProcessState::New {
            return Err(SimError::ProcessCommitted(id));
        }
        let removed = self.state.processes.remove(index);
        self.refresh_metrics();
        Ok(removed)
    }

    /// Replaces the whole workload, numbering from `P1` again
    ///
    /// Every spec is validated before anything changes.
    pub fn load_processes(&mut self, specs: Vec<ProcessSpec>) -> Result<Vec<ProcessId>, SimError> {
        if self.run_state == RunState::Running {
            return Err(SimError::SimulationRunning);
        }
        for spec in &specs {
            spec.validate()?;
        }
        self.reset();
        Ok(specs.into_iter().map(|spec| self.insert(spec)).collect())
    }

    /// Drops every process and all history
    pub fn reset(&mut self) {
        self.state = SimState::new(self.config.core_count);
        self.ids.reset();
        self.run_state = RunState::Stopped;
    }

    /// Same as [`Simulator::reset`]; kept as the name hosts use for the
    /// "clear workload" action
    pub fn clear_processes(&mut self) {
        self.reset();
    }

    /// Restarts the current workload from tick 0
    pub fn rewind(&mut self) {
        self.state.rewind();
        self.run_state = RunState::Stopped;
    }

    /// Enters the running state
    pub fn start(&mut self) -> Result<(), SimError> {
        if self.state.processes.is_empty() {
            return Err(SimError::NoProcesses);
        }
        if !self.is_finished() {
            self.run_state = RunState::Running;
        }
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.run_state == RunState::Running {
            self.run_state = RunState::Paused;
        }
    }

    pub fn stop(&mut self) {
        self.run_state = RunState::Stopped;
    }

    /// Advances one tick if running
    ///
    /// Returns whether a tick was executed. Intended for a host loop that
    /// calls it on a timer.
    pub fn tick(&mut self) -> bool {
        if self.run_state != RunState::Running {
            return false;
        }
        self.step();
        true
    }

    /// Advances exactly one tick regardless of run state
    pub fn step(&mut self) {
        let state = std::mem::take(&mut self.state);
        self.state = engine::advance(state, &self.config);
        if self.state.all_terminated() {
            self.run_state = RunState::Stopped;
        }
    }

    /// Steps until every process terminates or `max_ticks` have run
    ///
    /// Returns the number of ticks executed.
    pub fn run_to_completion(&mut self, max_ticks: u64) -> u64 {
        if self.state.processes.is_empty() {
            return 0;
        }
        let mut executed = 0;
        while !self.is_finished() && executed < max_ticks {
            self.step();
            executed += 1;
        }
        executed
    }

    /// Owned copy of everything a renderer needs
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            config: self.config.clone(),
            run_state: self.run_state,
            clock: self.clock(),
            processes: self.state.processes.clone(),
            cores: self.state.cores.clone(),
            io_queue: self.state.io_device.processes().to_vec(),
            events: self.state.events.events().to_vec(),
            metrics: self.state.metrics.clone(),
        }
    }

    fn check_spec(&self, spec: &ProcessSpec) -> Result<(), SimError> {
        spec.validate()?;
        let clock = self.clock();
        if spec.arrival_time < clock {
            return Err(ValidationError::ArrivalInPast {
                name: spec.name.trim().to_string(),
                arrival_time: spec.arrival_time,
                clock,
            }
            .into());
        }
        Ok(())
    }

    fn insert(&mut self, spec: ProcessSpec) -> ProcessId {
        let id = self.ids.allocate();
        let color = next_color(self.state.processes.iter().map(|p| p.color.as_str()));
        self.state.processes.push(Process::from_spec(id, color, spec));
        self.refresh_metrics();
        id
    }

    fn refresh_metrics(&mut self) {
        self.state.metrics = Metrics::compute(&self.state.processes, &self.state.cores, self.clock());
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}
