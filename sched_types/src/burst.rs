//! # Burst Sequences
//!
//! A process is described by an ordered list of CPU and I/O demands.
//!
//! ## Pattern Notation
//!
//! Bursts are written as `CPU(n)` and `IO(n)` tokens, case-insensitive,
//! separated by arbitrary text (canonically `->`):
//!
//! ```text
//! CPU(3) -> IO(2) -> CPU(5)
//! ```
//!
//! Tokens are extracted left to right. Anything between tokens is ignored,
//! and an input that yields no token at all is invalid.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of service a burst demands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BurstKind {
    Cpu,
    Io,
}

impl fmt::Display for BurstKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BurstKind::Cpu => write!(f, "CPU"),
            BurstKind::Io => write!(f, "IO"),
        }
    }
}

/// A contiguous demand for CPU or I/O service
///
/// `duration` never changes; `remaining` counts down by one per tick of
/// service and stays within `0..=duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Burst {
    pub kind: BurstKind,
    pub duration: u32,
    pub remaining: u32,
}

impl Burst {
    /// Creates a fresh burst with its full duration remaining
    pub fn new(kind: BurstKind, duration: u32) -> Self {
        Self {
            kind,
            duration,
            remaining: duration,
        }
    }

    pub fn cpu(duration: u32) -> Self {
        Self::new(BurstKind::Cpu, duration)
    }

    pub fn io(duration: u32) -> Self {
        Self::new(BurstKind::Io, duration)
    }

    pub fn is_cpu(&self) -> bool {
        self.kind == BurstKind::Cpu
    }

    pub fn is_io(&self) -> bool {
        self.kind == BurstKind::Io
    }

    /// Returns true once no service time remains
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Consumes one tick of service
    ///
    /// Returns true if this tick finished the burst.
    pub fn advance(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    /// Restores the full duration
    pub fn restore(&mut self) {
        self.remaining = self.duration;
    }
}

impl fmt::Display for Burst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.duration)
    }
}

/// Burst pattern error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BurstPatternError {
    #[error("Invalid burst pattern: {0:?}. Use format: CPU(3) -> IO(2) -> CPU(5)")]
    Empty(String),

    #[error("Burst duration out of range in token {0:?}")]
    DurationOverflow(String),
}

/// Parses a burst pattern, rejecting input without any token
pub fn parse_burst_pattern(pattern: &str) -> Result<Vec<Burst>, BurstPatternError> {
    let bursts = scan(pattern)?;
    if bursts.is_empty() {
        return Err(BurstPatternError::Empty(pattern.to_string()));
    }
    Ok(bursts)
}

/// Extracts bursts from a pattern, yielding an empty sequence when the
/// input is malformed
pub fn extract_bursts(pattern: &str) -> Vec<Burst> {
    scan(pattern).unwrap_or_default()
}

/// Renders bursts in canonical notation
pub fn format_burst_pattern(bursts: &[Burst]) -> String {
    bursts
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Sum of all burst durations (the total service time)
pub fn total_duration(bursts: &[Burst]) -> u64 {
    bursts.iter().map(|b| b.duration as u64).sum()
}

lazy_static::lazy_static! {
    static ref BURST_TOKEN: Regex =
        Regex::new(r"(?i)(cpu|io)\s*\(\s*([0-9]+)\s*\)").expect("burst token regex");
}

fn scan(pattern: &str) -> Result<Vec<Burst>, BurstPatternError> {
    BURST_TOKEN
        .captures_iter(pattern)
        .map(|caps| {
            let kind = if caps[1].eq_ignore_ascii_case("cpu") {
                BurstKind::Cpu
            } else {
                BurstKind::Io
            };
            let duration = caps[2]
                .parse::<u32>()
                .map_err(|_| BurstPatternError::DurationOverflow(caps[0].to_string()))?;
            Ok(Burst::new(kind, duration))
        })
        .collect()
}
