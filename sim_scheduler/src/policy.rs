//! # Selection Policies
//!
//! Pure per-core selection functions for the seven supported algorithms.
//!
//! ## Philosophy
//!
//! - **Mechanism, not policy**: The engine owns every state change. A policy
//!   only looks at candidates and returns a [`Decision`].
//! - **Determinism first**: Every tie is broken by arrival time, then by
//!   process id sequence. No decision depends on hashing or string order.
//! - **No hidden state**: A policy sees the core's quantum and candidate
//!   snapshots, nothing else.

use sched_types::{Algorithm, Process, ProcessId, Tick};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of a process as a policy sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub id: ProcessId,
    pub arrival_time: Tick,
    pub priority: u32,
    /// Remaining time of the active burst
    pub remaining: u32,
    pub level: usize,
}

impl Candidate {
    pub fn from_process(process: &Process) -> Self {
        Self {
            id: process.id,
            arrival_time: process.arrival_time,
            priority: process.priority,
            remaining: process.remaining_in_current_burst().unwrap_or(u32::MAX),
            level: process.queue_level,
        }
    }

    fn arrival_key(&self) -> (Tick, ProcessId) {
        (self.arrival_time, self.id)
    }

    fn burst_key(&self) -> (u32, Tick, ProcessId) {
        (self.remaining, self.arrival_time, self.id)
    }

    fn priority_key(&self) -> (u32, Tick, ProcessId) {
        (self.priority, self.arrival_time, self.id)
    }
}

/// Everything a policy may look at for one core
#[derive(Debug, Clone, Copy)]
pub struct PolicyInput<'a> {
    /// READY processes bound to the core, in queue order
    pub ready: &'a [Candidate],
    /// Process occupying the core at the start of the tick
    pub occupant: Option<&'a Candidate>,
    /// Occupant's remaining quantum, already decremented for this tick
    pub quantum_remaining: u32,
    pub time_quantum: u32,
    pub mlfq_levels: usize,
}

/// Why an occupant lost its core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreemptReason {
    /// A ready process has a shorter remaining burst
    ShorterRemaining { incoming: u32, outgoing: u32 },
    /// A ready process has a strictly better priority
    HigherPriority { incoming: u32, outgoing: u32 },
    /// The time slice ran out
    QuantumExpired,
    /// A process is waiting in a more urgent MLFQ level
    HigherQueueLevel { incoming: usize, outgoing: usize },
}

impl fmt::Display for PreemptReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreemptReason::ShorterRemaining { incoming, outgoing } => write!(
                f,
                "shorter remaining time ({} < {})",
                incoming, outgoing
            ),
            PreemptReason::HigherPriority { incoming, outgoing } => write!(
                f,
                "higher priority ({} < {})",
                incoming, outgoing
            ),
            PreemptReason::QuantumExpired => write!(f, "time quantum expired"),
            PreemptReason::HigherQueueLevel { incoming, outgoing } => write!(
                f,
                "higher priority queue (Q{} < Q{})",
                incoming, outgoing
            ),
        }
    }
}

/// Outcome of one policy call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Process that should occupy the core after this tick's scheduling
    pub selected: Option<ProcessId>,
    /// Whether the occupant must give up the core
    pub preempt: Option<PreemptReason>,
    /// New quantum to load, if any
    pub quantum: Option<u32>,
    /// MLFQ: move the occupant down one level
    pub demote: bool,
}

impl Decision {
    fn idle() -> Self {
        Self {
            selected: None,
            preempt: None,
            quantum: None,
            demote: false,
        }
    }

    fn keep(occupant: &Candidate) -> Self {
        Self {
            selected: Some(occupant.id),
            ..Self::idle()
        }
    }

    fn start(process: &Candidate, quantum: u32) -> Self {
        Self {
            selected: Some(process.id),
            quantum: Some(quantum),
            ..Self::idle()
        }
    }

    fn switch(process: &Candidate, quantum: u32, reason: PreemptReason) -> Self {
        Self {
            selected: Some(process.id),
            preempt: Some(reason),
            quantum: Some(quantum),
            demote: false,
        }
    }

    fn demoting(mut self) -> Self {
        self.demote = true;
        self
    }

    pub fn preempts(&self) -> bool {
        self.preempt.is_some()
    }
}

/// Quantum for an MLFQ level: `base * 2^level`
pub fn level_quantum(base: u32, level: usize) -> u32 {
    let factor = 1u32.checked_shl(level as u32).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// Runs the policy for `algorithm`
pub fn select(algorithm: Algorithm, input: &PolicyInput<'_>) -> Decision {
    match algorithm {
        Algorithm::Fcfs => fcfs(input),
        Algorithm::Sjf => sjf(input),
        Algorithm::Srtf => srtf(input),
        Algorithm::RoundRobin => round_robin(input),
        Algorithm::PriorityPreemptive => priority_preemptive(input),
        Algorithm::PriorityNonPreemptive => priority_non_preemptive(input),
        Algorithm::Mlfq => mlfq(input),
    }
}

/// First come, first served: earliest arrival, never preempts
pub fn fcfs(input: &PolicyInput<'_>) -> Decision {
    if let Some(occupant) = input.occupant {
        return Decision::keep(occupant);
    }
    match input.ready.iter().min_by_key(|c| c.arrival_key()) {
        Some(next) => Decision::start(next, input.time_quantum),
        None => Decision::idle(),
    }
}

/// Shortest job first: shortest remaining burst, never preempts
pub fn sjf(input: &PolicyInput<'_>) -> Decision {
    if let Some(occupant) = input.occupant {
        return Decision::keep(occupant);
    }
    match input.ready.iter().min_by_key(|c| c.burst_key()) {
        Some(next) => Decision::start(next, input.time_quantum),
        None => Decision::idle(),
    }
}

/// Shortest remaining time first
///
/// The occupant competes with the ready set on equal terms, so it keeps the
/// core on ties it wins by arrival or id.
pub fn srtf(input: &PolicyInput<'_>) -> Decision {
    let best = input
        .ready
        .iter()
        .chain(input.occupant)
        .min_by_key(|c| c.burst_key());

    match (best, input.occupant) {
        (None, _) => Decision::idle(),
        (Some(best), None) => Decision::start(best, input.time_quantum),
        (Some(best), Some(occupant)) if best.id == occupant.id => Decision::keep(occupant),
        (Some(best), Some(occupant)) => Decision::switch(
            best,
            input.time_quantum,
            PreemptReason::ShorterRemaining {
                incoming: best.remaining,
                outgoing: occupant.remaining,
            },
        ),
    }
}

/// Round robin over the ready queue in FIFO order
///
/// An expired quantum with nobody waiting leaves the occupant in place with
/// the quantum at zero, so the next arrival takes over on the following tick.
pub fn round_robin(input: &PolicyInput<'_>) -> Decision {
    let front = input.ready.first();
    match (input.occupant, front) {
        (None, Some(front)) => Decision::start(front, input.time_quantum),
        (None, None) => Decision::idle(),
        (Some(_), Some(front)) if input.quantum_remaining == 0 => {
            Decision::switch(front, input.time_quantum, PreemptReason::QuantumExpired)
        }
        (Some(occupant), _) => Decision::keep(occupant),
    }
}

/// Preemptive priority, lower value wins
///
/// Only a strictly better priority preempts; equal priority never does.
pub fn priority_preemptive(input: &PolicyInput<'_>) -> Decision {
    let best = input.ready.iter().min_by_key(|c| c.priority_key());
    match (input.occupant, best) {
        (None, Some(best)) => Decision::start(best, input.time_quantum),
        (None, None) => Decision::idle(),
        (Some(occupant), Some(best)) if best.priority < occupant.priority => Decision::switch(
            best,
            input.time_quantum,
            PreemptReason::HigherPriority {
                incoming: best.priority,
                outgoing: occupant.priority,
            },
        ),
        (Some(occupant), _) => Decision::keep(occupant),
    }
}

/// Non-preemptive priority, lower value wins
pub fn priority_non_preemptive(input: &PolicyInput<'_>) -> Decision {
    if let Some(occupant) = input.occupant {
        return Decision::keep(occupant);
    }
    match input.ready.iter().min_by_key(|c| c.priority_key()) {
        Some(next) => Decision::start(next, input.time_quantum),
        None => Decision::idle(),
    }
}

/// Multi-level feedback queue
///
/// Levels are derived from each candidate's `level`; within a level the
/// ready-queue order is the FIFO order. Quantum expiry demotes the occupant
/// one level. Preemption by a more urgent level does not.
pub fn mlfq(input: &PolicyInput<'_>) -> Decision {
    let lowest = input.mlfq_levels.saturating_sub(1);
    let quantum = |c: &Candidate| level_quantum(input.time_quantum, c.level);
    // first min wins, which keeps FIFO order within a level
    let most_urgent = |max_level: usize| {
        input
            .ready
            .iter()
            .filter(move |c| c.level <= max_level)
            .min_by_key(|c| c.level)
    };

    let Some(occupant) = input.occupant else {
        return match most_urgent(usize::MAX) {
            Some(next) => Decision::start(next, quantum(next)),
            None => Decision::idle(),
        };
    };

    if occupant.level > 0 {
        if let Some(next) = most_urgent(occupant.level - 1) {
            return Decision::switch(
                next,
                quantum(next),
                PreemptReason::HigherQueueLevel {
                    incoming: next.level,
                    outgoing: occupant.level,
                },
            );
        }
    }

    if input.quantum_remaining > 0 {
        return Decision::keep(occupant);
    }

    let demoted_level = (occupant.level + 1).min(lowest);
    match most_urgent(demoted_level) {
        Some(next) => {
            Decision::switch(next, quantum(next), PreemptReason::QuantumExpired).demoting()
        }
        None => Decision {
            quantum: Some(level_quantum(input.time_quantum, demoted_level)),
            ..Decision::keep(occupant)
        }
        .demoting(),
    }
}
