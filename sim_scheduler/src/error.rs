//! Simulator error types

use sched_types::{BurstPatternError, ProcessId, ValidationError};
use thiserror::Error;

/// Errors returned by state-mutating simulator calls
///
/// A tick itself never fails; these are all rejections at the API boundary
/// that leave the simulation state unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("Invalid process: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Pattern(#[from] BurstPatternError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation not allowed while the simulation is running")]
    SimulationRunning,

    #[error("Core count cannot change once the simulation has advanced")]
    CoreCountLocked,

    #[error("MLFQ level count cannot change once the simulation has advanced")]
    MlfqLevelsLocked,

    #[error("Process not found: {0}")]
    ProcessNotFound(ProcessId),

    #[error("Process {0} has already arrived and cannot be removed")]
    ProcessCommitted(ProcessId),

    #[error("No processes to simulate")]
    NoProcesses,
}
