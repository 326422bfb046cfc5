//! Simulation configuration

use crate::error::SimError;
use sched_types::Algorithm;
use serde::{Deserialize, Serialize};

/// Largest supported number of simulated cores
pub const MAX_CORES: usize = 16;

/// Largest supported number of MLFQ levels
pub const MAX_MLFQ_LEVELS: usize = 8;

/// Policy parameters for a simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Selection policy applied on every core
    pub algorithm: Algorithm,
    /// Number of simulated cores
    pub core_count: usize,
    /// Round-robin quantum, and the level-0 quantum for MLFQ
    pub time_quantum: u32,
    /// Whether waiting READY processes gain priority over time
    pub aging_enabled: bool,
    /// Ticks of continuous waiting before one priority boost
    pub aging_threshold: u64,
    /// Number of MLFQ levels; level L gets `time_quantum * 2^L`
    pub mlfq_levels: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Fcfs,
            core_count: 1,
            time_quantum: 2,
            aging_enabled: false,
            aging_threshold: 5,
            mlfq_levels: 3,
        }
    }
}

impl SimConfig {
    /// Convenience constructor for a given algorithm with defaults elsewhere
    pub fn for_algorithm(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    pub fn with_cores(mut self, core_count: usize) -> Self {
        self.core_count = core_count;
        self
    }

    pub fn with_quantum(mut self, time_quantum: u32) -> Self {
        self.time_quantum = time_quantum;
        self
    }

    pub fn with_aging(mut self, threshold: u64) -> Self {
        self.aging_enabled = true;
        self.aging_threshold = threshold;
        self
    }

    pub fn with_mlfq_levels(mut self, levels: usize) -> Self {
        self.mlfq_levels = levels;
        self
    }

    /// Rejects parameter combinations the engine cannot run
    pub fn validate(&self) -> Result<(), SimError> {
        if self.core_count == 0 || self.core_count > MAX_CORES {
            return Err(SimError::InvalidConfig(format!(
                "core count must be between 1 and {}, got {}",
                MAX_CORES, self.core_count
            )));
        }
        if self.time_quantum == 0 {
            return Err(SimError::InvalidConfig(
                "time quantum must be at least 1".to_string(),
            ));
        }
        if self.aging_threshold == 0 {
            return Err(SimError::InvalidConfig(
                "aging threshold must be at least 1".to_string(),
            ));
        }
        if self.mlfq_levels == 0 || self.mlfq_levels > MAX_MLFQ_LEVELS {
            return Err(SimError::InvalidConfig(format!(
                "MLFQ level count must be between 1 and {}, got {}",
                MAX_MLFQ_LEVELS, self.mlfq_levels
            )));
        }
        Ok(())
    }
}

/// Run state of the simulation as seen by the driving loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Stopped,
    Running,
    Paused,
}

impl Default for RunState {
    fn default() -> Self {
        RunState::Stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.algorithm, Algorithm::Fcfs);
        assert_eq!(config.core_count, 1);
        assert_eq!(config.time_quantum, 2);
        assert!(!config.aging_enabled);
        assert_eq!(config.aging_threshold, 5);
        assert_eq!(config.mlfq_levels, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SimConfig::default().with_cores(0).validate().is_err());
        assert!(SimConfig::default().with_cores(MAX_CORES + 1).validate().is_err());
        assert!(SimConfig::default().with_quantum(0).validate().is_err());
        assert!(SimConfig::default().with_aging(0).validate().is_err());
        assert!(SimConfig::default().with_mlfq_levels(0).validate().is_err());
        assert!(SimConfig::default().with_mlfq_levels(9).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "algorithm": "round_robin", "time_quantum": 4 }"#).unwrap();
        assert_eq!(config.algorithm, Algorithm::RoundRobin);
        assert_eq!(config.time_quantum, 4);
        assert_eq!(config.core_count, 1);
    }
}
