//! Identifiers for simulated entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unique identifier for a simulated process
///
/// Ids are handed out in insertion order and render as `P1`, `P2`, ...
/// Comparing two ids compares their sequence numbers, so `P2 < P10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(u32);

impl ProcessId {
    /// Creates a process ID from its sequence number
    pub const fn new(seq: u32) -> Self {
        Self(seq)
    }

    /// Returns the sequence number
    pub fn seq(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Error returned when a textual id cannot be parsed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid process id: {0}")]
pub struct IdParseError(pub String);

impl FromStr for ProcessId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix('P')
            .or_else(|| s.trim().strip_prefix('p'))
            .ok_or_else(|| IdParseError(s.to_string()))?;
        digits
            .parse::<u32>()
            .map(ProcessId)
            .map_err(|_| IdParseError(s.to_string()))
    }
}

/// Identifier for a CPU core
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoreId(pub usize);

impl CoreId {
    /// Returns the core index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Core {}", self.0)
    }
}

/// Hands out process ids in insertion order
///
/// The counter restarts when the simulation is cleared, so a fresh
/// workload always starts at `P1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessIdAllocator {
    next: u32,
}

impl ProcessIdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns the next id and advances the counter
    pub fn allocate(&mut self) -> ProcessId {
        let id = ProcessId(self.next);
        self.next += 1;
        id
    }

    /// Restarts numbering at `P1`
    pub fn reset(&mut self) {
        self.next = 1;
    }
}

impl Default for ProcessIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_insertion_order() {
        let mut alloc = ProcessIdAllocator::new();
        let p1 = alloc.allocate();
        let p2 = alloc.allocate();
        assert_eq!(p1.to_string(), "P1");
        assert_eq!(p2.to_string(), "P2");
        assert!(p1 < p2);
    }

    #[test]
    fn test_allocator_reset() {
        let mut alloc = ProcessIdAllocator::new();
        alloc.allocate();
        alloc.allocate();
        alloc.reset();
        assert_eq!(alloc.allocate(), ProcessId::new(1));
    }

    #[test]
    fn test_numeric_ordering_not_lexical() {
        assert!(ProcessId::new(2) < ProcessId::new(10));
    }

    #[test]
    fn test_process_id_parse() {
        assert_eq!("P7".parse::<ProcessId>(), Ok(ProcessId::new(7)));
        assert_eq!(" p12 ".parse::<ProcessId>(), Ok(ProcessId::new(12)));
        assert!("7".parse::<ProcessId>().is_err());
        assert!("Px".parse::<ProcessId>().is_err());
    }

    #[test]
    fn test_core_id_display() {
        assert_eq!(CoreId(3).to_string(), "Core 3");
    }
}
