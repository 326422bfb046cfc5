//! # Scheduling Types
//!
//! This crate defines the value types shared by the scheduling simulator.
//!
//! ## Philosophy
//!
//! - **Values, not handles**: Processes and bursts are plain data that the
//!   engine copies, updates and commits as a whole.
//! - **Validate at the boundary**: Malformed input is rejected here, before
//!   it can ever reach the tick engine.
//! - **Deterministic ordering**: Identifiers carry their insertion order so
//!   tie-breaks never depend on hashing or string collation.
//!
//! ## Key Types
//!
//! - [`ProcessId`] / [`CoreId`]: identifiers for processes and CPU cores
//! - [`Burst`]: a single CPU or I/O demand with its remaining time
//! - [`Process`]: a simulated process with static and dynamic attributes
//! - [`Algorithm`]: the closed set of scheduling policies

pub mod algorithm;
pub mod burst;
pub mod ids;
pub mod palette;
pub mod process;

pub use algorithm::{Algorithm, AlgorithmParseError};
pub use burst::{
    extract_bursts, format_burst_pattern, parse_burst_pattern, total_duration, Burst,
    BurstKind, BurstPatternError,
};
pub use ids::{CoreId, IdParseError, ProcessId, ProcessIdAllocator};
pub use palette::{next_color, IDLE_COLOR, PROCESS_COLORS};
pub use process::{Process, ProcessSpec, ProcessState, ValidationError};

/// Simulated time, in ticks
pub type Tick = u64;
