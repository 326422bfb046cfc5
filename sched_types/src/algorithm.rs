//! Scheduling algorithm tag

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of selection policies the engine knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// First come, first served
    Fcfs,
    /// Shortest job first (non-preemptive)
    Sjf,
    /// Shortest remaining time first (preemptive SJF)
    Srtf,
    /// Round robin with a fixed time quantum
    #[serde(alias = "rr")]
    RoundRobin,
    /// Priority scheduling, preempting on strictly better priority
    #[serde(alias = "priority")]
    PriorityPreemptive,
    /// Priority scheduling, never preempting
    #[serde(alias = "priority_np")]
    PriorityNonPreemptive,
    /// Multi-level feedback queue
    Mlfq,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Algorithm::Fcfs,
        Algorithm::Sjf,
        Algorithm::Srtf,
        Algorithm::RoundRobin,
        Algorithm::PriorityPreemptive,
        Algorithm::PriorityNonPreemptive,
        Algorithm::Mlfq,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::Fcfs => "First Come First Serve",
            Algorithm::Sjf => "Shortest Job First",
            Algorithm::Srtf => "Shortest Remaining Time First",
            Algorithm::RoundRobin => "Round Robin",
            Algorithm::PriorityPreemptive => "Priority (Preemptive)",
            Algorithm::PriorityNonPreemptive => "Priority (Non-Preemptive)",
            Algorithm::Mlfq => "Multi-Level Feedback Queue",
        }
    }

    /// Short name used in logs and on the command line
    pub fn short_name(&self) -> &'static str {
        match self {
            Algorithm::Fcfs => "FCFS",
            Algorithm::Sjf => "SJF",
            Algorithm::Srtf => "SRTF",
            Algorithm::RoundRobin => "RR",
            Algorithm::PriorityPreemptive => "PRIORITY",
            Algorithm::PriorityNonPreemptive => "PRIORITY-NP",
            Algorithm::Mlfq => "MLFQ",
        }
    }

    /// Returns true if a running process can be displaced mid-burst
    pub fn is_preemptive(&self) -> bool {
        matches!(
            self,
            Algorithm::Srtf | Algorithm::RoundRobin | Algorithm::PriorityPreemptive | Algorithm::Mlfq
        )
    }

    /// Returns true if the policy consumes the time quantum
    pub fn uses_quantum(&self) -> bool {
        matches!(self, Algorithm::RoundRobin | Algorithm::Mlfq)
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Fcfs
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Error returned for an unknown algorithm name
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown algorithm: {0}. Expected one of fcfs, sjf, srtf, rr, priority, priority_np, mlfq")]
pub struct AlgorithmParseError(pub String);

impl FromStr for Algorithm {
    type Err = AlgorithmParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "fcfs" => Ok(Algorithm::Fcfs),
            "sjf" => Ok(Algorithm::Sjf),
            "srtf" => Ok(Algorithm::Srtf),
            "rr" | "round_robin" => Ok(Algorithm::RoundRobin),
            "priority" | "priority_preemptive" => Ok(Algorithm::PriorityPreemptive),
            "priority_np" | "priority_non_preemptive" => Ok(Algorithm::PriorityNonPreemptive),
            "mlfq" => Ok(Algorithm::Mlfq),
            _ => Err(AlgorithmParseError(s.to_string())),
        }
    }
}
