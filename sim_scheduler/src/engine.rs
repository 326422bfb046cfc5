//! # Tick Engine
//!
//! Advances a [`SimState`] by exactly one unit of simulated time.
//!
//! ## Philosophy
//!
//! - **Determinism first**: Same state + same config => same next state,
//!   byte for byte, including the event log.
//! - **State as a value**: [`advance`] consumes a state and returns the
//!   successor. Callers never observe a half-applied tick.
//!
//! ## Phases
//!
//! Within one tick starting at clock `t`:
//!
//! 1. Arrivals at `t` are bound to the least-loaded core
//! 2. Finished I/O bursts hand their process back to its core
//! 3. Every process on the I/O device advances one unit
//! 4. Aging boosts long-waiting READY processes (if enabled)
//! 5. Each core runs its policy and applies the decision
//! 6. Each occupant executes one unit of its CPU burst
//! 7. Processes still READY accrue one tick of waiting
//! 8. The clock moves to `t + 1` and metrics are recomputed

use crate::aging;
use crate::balancer;
use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::cpu_core::CpuCore;
use crate::io_device::IoDevice;
use crate::metrics::Metrics;
use crate::policy::{self, Candidate, PolicyInput};
use sched_log::{EventKind, EventLog, SchedulerEvent};
use sched_types::{BurstKind, CoreId, Process, ProcessId, ProcessState, Tick};
use serde::{Deserialize, Serialize};

/// Complete dynamic state of a simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub clock: SimClock,
    /// Every process, in insertion order
    pub processes: Vec<Process>,
    pub cores: Vec<CpuCore>,
    pub io_device: IoDevice,
    pub events: EventLog,
    pub metrics: Metrics,
}

impl SimState {
    /// Empty state at tick 0 with `core_count` idle cores
    pub fn new(core_count: usize) -> Self {
        Self {
            cores: (0..core_count).map(|i| CpuCore::new(CoreId(i))).collect(),
            ..Self::default()
        }
    }

    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    pub fn process(&self, id: ProcessId) -> Option<&Process> {
        self.processes.iter().find(|p| p.id == id)
    }

    /// True once at least one process exists and every one has terminated
    pub fn all_terminated(&self) -> bool {
        !self.processes.is_empty() && self.processes.iter().all(Process::is_terminated)
    }

    /// Puts every process back to NEW and clears all run-time history
    pub fn rewind(&mut self) {
        for process in &mut self.processes {
            process.rewind();
        }
        let core_count = self.cores.len();
        self.cores = (0..core_count).map(|i| CpuCore::new(CoreId(i))).collect();
        self.io_device = IoDevice::new();
        self.events = EventLog::new();
        self.clock.reset();
        self.metrics = Metrics::compute(&self.processes, &self.cores, 0);
    }

    fn index_of(&self, id: ProcessId) -> usize {
        slot(&self.processes, id)
    }
}

/// Index of a process the engine holds a reference to
fn slot(processes: &[Process], id: ProcessId) -> usize {
    processes
        .iter()
        .position(|p| p.id == id)
        .unwrap_or_else(|| panic!("{} is referenced by the scheduler but does not exist", id))
}

/// Runs one tick and returns the successor state
pub fn advance(mut state: SimState, config: &SimConfig) -> SimState {
    let now = state.now();
    let mut events = Vec::new();

    admit_arrivals(&mut state, now, &mut events);
    complete_io(&mut state, now, &mut events);
    state.io_device.progress(&mut state.processes);
    if config.aging_enabled {
        events.extend(aging::apply(&mut state.processes, now, config.aging_threshold));
    }
    for index in 0..state.cores.len() {
        schedule_core(&mut state, config, index, now, &mut events);
    }
    for index in 0..state.cores.len() {
        execute_core(&mut state, index, now, &mut events);
    }
    for process in state
        .processes
        .iter_mut()
        .filter(|p| p.state == ProcessState::Ready)
    {
        process.wait_time += 1;
    }

    state.clock.advance();
    state.events.extend(events);
    state.metrics = Metrics::compute(&state.processes, &state.cores, state.now());
    state
}

fn admit_arrivals(state: &mut SimState, now: Tick, events: &mut Vec<SchedulerEvent>) {
    let arriving: Vec<usize> = state
        .processes
        .iter()
        .enumerate()
        .filter(|(_, p)| p.state == ProcessState::New && p.arrival_time == now)
        .map(|(i, _)| i)
        .collect();

    for index in arriving {
        let Some(core) = balancer::least_loaded(&state.cores) else {
            return;
        };
        let process = &mut state.processes[index];
        process.assigned_core = Some(core);
        process.queue_level = 0;

        events.push(
            SchedulerEvent::new(now, EventKind::Arrival, format!("{} arrived", process.name))
                .with_process(process.id)
                .with_core(core),
        );
        if state.cores.len() > 1 {
            events.push(
                SchedulerEvent::new(
                    now,
                    EventKind::LoadBalance,
                    format!(
                        "{} assigned to {} (load: {})",
                        process.name,
                        core,
                        state.cores[core.index()].load()
                    ),
                )
                .with_process(process.id)
                .with_core(core),
            );
        }

        match process.current_burst().map(|b| (b.kind, b.duration)) {
            Some((BurstKind::Io, duration)) => {
                process.state = ProcessState::Waiting;
                state.io_device.enqueue(process.id);
                events.push(io_start_event(process, core, now, duration));
            }
            _ => {
                process.state = ProcessState::Ready;
                process.waiting_since = Some(now);
                state.cores[core.index()].enqueue(process.id);
            }
        }
    }
}

fn complete_io(state: &mut SimState, now: Tick, events: &mut Vec<SchedulerEvent>) {
    for id in state.io_device.finished(&state.processes) {
        let index = state.index_of(id);
        let process = &mut state.processes[index];
        let Some(core) = process.assigned_core else {
            continue;
        };

        match process.advance_burst().map(|b| (b.kind, b.duration)) {
            Some((BurstKind::Cpu, _)) => {
                state.io_device.remove(id);
                process.state = ProcessState::Ready;
                process.waiting_since = Some(now);
                state.cores[core.index()].enqueue(id);
                events.push(
                    SchedulerEvent::new(
                        now,
                        EventKind::IoComplete,
                        format!("{} completed I/O", process.name),
                    )
                    .with_process(id)
                    .with_core(core),
                );
            }
            Some((BurstKind::Io, duration)) => {
                events.push(
                    SchedulerEvent::new(
                        now,
                        EventKind::IoComplete,
                        format!("{} completed I/O", process.name),
                    )
                    .with_process(id)
                    .with_core(core),
                );
                events.push(io_start_event(process, core, now, duration));
            }
            None => {
                state.io_device.remove(id);
                process.terminate(now);
                events.push(complete_event(process, core, now));
            }
        }
    }
}

fn schedule_core(
    state: &mut SimState,
    config: &SimConfig,
    index: usize,
    now: Tick,
    events: &mut Vec<SchedulerEvent>,
) {
    let SimState {
        processes, cores, ..
    } = state;
    let core = &mut cores[index];
    let core_id = core.id;

    if core.current.is_some() && core.quantum_remaining > 0 {
        core.quantum_remaining -= 1;
    }

    core.ready_queue
        .retain(|&id| processes[slot(processes, id)].state == ProcessState::Ready);
    let ready: Vec<Candidate> = core
        .ready_queue
        .iter()
        .map(|&id| Candidate::from_process(&processes[slot(processes, id)]))
        .collect();
    let occupant = core
        .current
        .map(|id| Candidate::from_process(&processes[slot(processes, id)]));

    let decision = policy::select(
        config.algorithm,
        &PolicyInput {
            ready: &ready,
            occupant: occupant.as_ref(),
            quantum_remaining: core.quantum_remaining,
            time_quantum: config.time_quantum,
            mlfq_levels: config.mlfq_levels,
        },
    );

    if decision.demote {
        if let Some(outgoing) = core.current {
            let at = slot(processes, outgoing);
            let process = &mut processes[at];
            let from = process.queue_level;
            let to = (from + 1).min(config.mlfq_levels.saturating_sub(1));
            if to > from {
                process.queue_level = to;
                events.push(
                    SchedulerEvent::new(
                        now,
                        EventKind::Demotion,
                        format!("{} demoted from Q{} to Q{}", process.name, from, to),
                    )
                    .with_process(outgoing)
                    .with_core(core_id),
                );
            }
        }
    }

    let mut displaced = None;
    if let Some(reason) = &decision.preempt {
        if let Some(outgoing) = core.current.take() {
            let incoming = decision
                .selected
                .map(|id| processes[slot(processes, id)].name.clone())
                .unwrap_or_else(|| "nobody".to_string());

            let at = slot(processes, outgoing);
            let process = &mut processes[at];
            process.state = ProcessState::Ready;
            process.waiting_since = Some(now);
            core.enqueue(outgoing);

            events.push(
                SchedulerEvent::new(
                    now,
                    EventKind::Preempt,
                    format!(
                        "{} preempted by {} on {}: {}",
                        process.name, incoming, core_id, reason
                    ),
                )
                .with_process(outgoing)
                .with_core(core_id),
            );
            displaced = Some(process.name.clone());
        }
    }

    match decision.selected {
        Some(id) if core.current == Some(id) => {
            if let Some(quantum) = decision.quantum {
                core.quantum_remaining = quantum;
            }
            let process = &processes[slot(processes, id)];
            core.extend_segment(id, &process.color, now);
        }
        Some(id) => {
            assert!(
                core.current.is_none(),
                "policy replaced the occupant of {} without preempting it",
                core_id
            );
            assert!(
                core.ready_queue.contains(&id),
                "policy selected {} which is not ready on {}",
                id,
                core_id
            );

            let at = slot(processes, id);
            let process = &mut processes[at];
            process.state = ProcessState::Running;
            process.waiting_since = None;
            if process.start_time.is_none() {
                process.start_time = Some(now);
                process.response_time = Some(now.saturating_sub(process.arrival_time));
            }
            core.dequeue(id);
            core.current = Some(id);
            core.open_segment(id, &process.color, now);
            if let Some(quantum) = decision.quantum {
                core.quantum_remaining = quantum;
            }

            let event = match displaced {
                Some(previous) => SchedulerEvent::new(
                    now,
                    EventKind::ContextSwitch,
                    format!(
                        "{} started on {} (context switch from {})",
                        process.name, core_id, previous
                    ),
                ),
                None => SchedulerEvent::new(
                    now,
                    EventKind::Start,
                    format!("{} started on {}", process.name, core_id),
                ),
            };
            events.push(event.with_process(id).with_core(core_id));
        }
        None => {
            assert!(
                core.current.is_none(),
                "policy left {} idle while it is occupied",
                core_id
            );
            core.record_idle(now);
        }
    }
}

fn execute_core(state: &mut SimState, index: usize, now: Tick, events: &mut Vec<SchedulerEvent>) {
    let Some(id) = state.cores[index].current else {
        return;
    };
    let core_id = state.cores[index].id;
    let finished_at = now.saturating_add(1);
    let process_index = state.index_of(id);
    let process = &mut state.processes[process_index];

    let Some(burst) = process.current_burst_mut() else {
        return;
    };
    debug_assert!(burst.is_cpu(), "{} is running an I/O burst", id);
    if !burst.advance() {
        return;
    }

    match process.advance_burst().map(|b| (b.kind, b.duration)) {
        None => {
            process.terminate(finished_at);
            state.cores[index].current = None;
            events.push(complete_event(process, core_id, finished_at));
        }
        Some((BurstKind::Io, duration)) => {
            process.state = ProcessState::Waiting;
            state.cores[index].current = None;
            state.io_device.enqueue(id);
            events.push(io_start_event(process, core_id, finished_at, duration));
        }
        Some((BurstKind::Cpu, _)) => {}
    }
}

fn io_start_event(process: &Process, core: CoreId, tick: Tick, duration: u32) -> SchedulerEvent {
    SchedulerEvent::new(
        tick,
        EventKind::IoStart,
        format!("{} starting I/O operation ({} units)", process.name, duration),
    )
    .with_process(process.id)
    .with_core(core)
}

fn complete_event(process: &Process, core: CoreId, tick: Tick) -> SchedulerEvent {
    SchedulerEvent::new(
        tick,
        EventKind::Complete,
        format!("{} completed execution", process.name),
    )
    .with_process(process.id)
    .with_core(core)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_types::{Algorithm, ProcessSpec};

    fn state_with(specs: &[(&str, Tick, u32, &str)], cores: usize) -> SimState {
        let mut state = SimState::new(cores);
        for (n, (name, arrival, priority, pattern)) in specs.iter().enumerate() {
            let spec = ProcessSpec::from_pattern(*name, *arrival, *priority, pattern).unwrap();
            state.processes.push(Process::from_spec(
                ProcessId::new(n as u32 + 1),
                sched_types::PROCESS_COLORS[n % 12],
                spec,
            ));
        }
        state
    }

    fn run(mut state: SimState, config: &SimConfig, ticks: u64) -> SimState {
        for _ in 0..ticks {
            state = advance(state, config);
        }
        state
    }

    #[test]
    fn test_idle_tick_records_idle_segment() {
        let state = advance(SimState::new(1), &SimConfig::default());
        assert_eq!(state.now(), 1);
        assert_eq!(state.cores[0].idle_ticks(), 1);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_arrival_starts_same_tick() {
        let state = state_with(&[("A", 0, 1, "CPU(2)")], 1);
        let state = advance(state, &SimConfig::default());

        let a = &state.processes[0];
        assert_eq!(a.state, ProcessState::Running);
        assert_eq!(a.start_time, Some(0));
        assert_eq!(a.response_time, Some(0));
        assert_eq!(a.remaining_in_current_burst(), Some(1));
        let kinds: Vec<EventKind> = state.events.events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Arrival, EventKind::Start]);
    }

    #[test]
    fn test_completion_at_end_of_tick() {
        let state = state_with(&[("A", 0, 1, "CPU(2)")], 1);
        let state = run(state, &SimConfig::default(), 2);
        let a = &state.processes[0];
        assert_eq!(a.completion_time, Some(2));
        assert_eq!(a.turnaround_time, 2);
        assert_eq!(a.wait_time, 0);
        assert!(state.all_terminated());
        assert!(state.cores[0].current.is_none());
    }

    #[test]
    fn test_io_round_trip() {
        // A runs 0..2, does I/O during 2..4, back on the CPU at 4
        let state = state_with(&[("A", 0, 1, "CPU(2) -> IO(2) -> CPU(1)")], 1);
        let config = SimConfig::default();

        let state = run(state, &config, 2);
        assert_eq!(state.processes[0].state, ProcessState::Waiting);
        assert!(state.io_device.contains(ProcessId::new(1)));

        let state = run(state, &config, 2);
        assert_eq!(state.processes[0].remaining_in_current_burst(), Some(0));

        // back on the CPU at 4 and finished by 5
        let state = advance(state, &config);
        assert!(state.io_device.is_empty());
        assert!(state.all_terminated());
        assert_eq!(state.processes[0].completion_time, Some(5));
        assert_eq!(state.processes[0].wait_time, 0);
        assert_eq!(state.cores[0].idle_ticks(), 2);
    }

    #[test]
    fn test_io_first_burst_goes_to_device() {
        let state = state_with(&[("A", 0, 1, "IO(2) -> CPU(1)")], 1);
        let config = SimConfig::default();
        let state = advance(state, &config);
        assert_eq!(state.processes[0].state, ProcessState::Waiting);
        assert_eq!(state.processes[0].assigned_core, Some(CoreId(0)));

        let state = run(state, &config, 2);
        assert!(state.all_terminated());
        assert_eq!(state.processes[0].completion_time, Some(3));
        assert_eq!(state.processes[0].response_time, Some(2));
    }

    #[test]
    fn test_trailing_io_terminates_on_completion() {
        let state = state_with(&[("A", 0, 1, "CPU(1) -> IO(2)")], 1);
        let state = run(state, &SimConfig::default(), 4);
        let a = &state.processes[0];
        assert!(a.is_terminated());
        assert_eq!(a.completion_time, Some(3));
        assert_eq!(state.events.of_kind(EventKind::Complete).count(), 1);
    }

    #[test]
    fn test_preemption_emits_context_switch() {
        let config = SimConfig::for_algorithm(Algorithm::Srtf);
        let state = state_with(&[("Long", 0, 1, "CPU(6)"), ("Short", 1, 1, "CPU(1)")], 1);
        let state = run(state, &config, 2);

        let at_one: Vec<EventKind> = state.events.at_tick(1).map(|e| e.kind).collect();
        assert_eq!(
            at_one,
            vec![EventKind::Arrival, EventKind::Preempt, EventKind::ContextSwitch]
        );
        let preempt = state.events.of_kind(EventKind::Preempt).next().unwrap();
        assert!(preempt.message.starts_with("Long preempted by Short on Core 0"));
        assert_eq!(state.processes[0].state, ProcessState::Ready);
        assert_eq!(state.processes[0].waiting_since, Some(1));
        assert!(state.processes[1].is_terminated());
    }

    #[test]
    fn test_demotion_never_moves_up() {
        let config = SimConfig::for_algorithm(Algorithm::Mlfq)
            .with_quantum(1)
            .with_mlfq_levels(1);
        let mut state = state_with(&[("A", 0, 1, "CPU(20)")], 1);
        state.processes[0].queue_level = 2;

        let state = run(state, &config, 6);
        assert_eq!(state.processes[0].queue_level, 2);
        assert_eq!(state.events.of_kind(EventKind::Demotion).count(), 0);
    }

    #[test]
    fn test_wait_accrues_while_ready() {
        let state = state_with(&[("A", 0, 1, "CPU(3)"), ("B", 0, 1, "CPU(1)")], 1);
        let state = run(state, &SimConfig::default(), 2);
        assert_eq!(state.processes[1].wait_time, 2);
        assert_eq!(state.processes[0].wait_time, 0);
    }

    #[test]
    fn test_rewind_restores_initial_state() {
        let initial = state_with(&[("A", 0, 1, "CPU(2) -> IO(1) -> CPU(1)")], 2);
        let mut state = run(initial.clone(), &SimConfig::default().with_cores(2), 6);
        state.rewind();
        assert_eq!(state.processes, initial.processes);
        assert_eq!(state.cores, initial.cores);
        assert_eq!(state.now(), 0);
        assert!(state.events.is_empty());
    }
}
