//! # Simulation Clock
//!
//! Deterministic discrete clock.
//!
//! ## Philosophy
//!
//! **Determinism enables thorough testing.**
//!
//! Time only moves when the engine completes a tick. There is no wall-clock
//! coupling; a host that wants pacing sleeps between calls on its own.

use sched_types::Tick;
use serde::{Deserialize, Serialize};

/// Discrete simulation clock
///
/// # Examples
///
/// ```
/// use sim_scheduler::clock::SimClock;
///
/// let mut clock = SimClock::new();
/// assert_eq!(clock.now(), 0);
///
/// clock.advance();
/// clock.advance();
/// assert_eq!(clock.now(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimClock {
    ticks: Tick,
}

impl SimClock {
    /// Creates a clock at tick 0
    pub fn new() -> Self {
        Self { ticks: 0 }
    }

    /// Creates a clock at a specific tick
    pub fn at(ticks: Tick) -> Self {
        Self { ticks }
    }

    /// Current simulated time
    pub fn now(&self) -> Tick {
        self.ticks
    }

    /// The tick that the in-progress tick ends at
    pub fn next(&self) -> Tick {
        self.ticks.saturating_add(1)
    }

    /// Moves time forward by exactly one tick
    pub fn advance(&mut self) {
        self.ticks = self.next();
    }

    /// Whether any tick has been executed yet
    pub fn has_started(&self) -> bool {
        self.ticks > 0
    }

    pub fn reset(&mut self) {
        self.ticks = 0;
    }
}
