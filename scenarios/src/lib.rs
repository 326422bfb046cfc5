//! Scenario files and built-in workloads.
//!
//! A scenario describes a workload declaratively in a JSON file: a name, an
//! optional simulator configuration and a list of processes written in
//! burst pattern notation. The loader validates the file and applies it to a
//! [`Simulator`].

pub mod presets;

pub use presets::{find_preset, preset_names, presets};

use sched_types::{BurstPatternError, ProcessId, ProcessSpec, Tick};
use serde::{Deserialize, Serialize};
use sim_scheduler::{SimConfig, SimError, Simulator};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Conventional file extension for scenario files
pub const SCENARIO_EXTENSION: &str = "json";

/// Scenario file format version.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioFormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl ScenarioFormatVersion {
    pub const CURRENT: ScenarioFormatVersion = ScenarioFormatVersion::new(1, 0);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for ScenarioFormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

/// One process entry in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioProcess {
    pub name: String,
    #[serde(default)]
    pub arrival_time: Tick,
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// Burst pattern, e.g. `CPU(3) -> IO(2) -> CPU(1)`
    pub bursts: String,
}

fn default_priority() -> u32 {
    1
}

impl ScenarioProcess {
    pub fn new(name: &str, arrival_time: Tick, priority: u32, bursts: &str) -> Self {
        Self {
            name: name.to_string(),
            arrival_time,
            priority,
            bursts: bursts.to_string(),
        }
    }

    /// Parses and validates the entry into a process definition
    pub fn to_spec(&self) -> Result<ProcessSpec, ScenarioError> {
        let spec = ProcessSpec::from_pattern(
            self.name.as_str(),
            self.arrival_time,
            self.priority,
            &self.bursts,
        )
        .map_err(|source| ScenarioError::Pattern {
            process: self.name.clone(),
            source,
        })?;
        spec.validate()
            .map_err(|err| ScenarioError::Invalid(err.to_string()))?;
        Ok(spec)
    }
}

/// Top-level scenario document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scenario {
    #[serde(default)]
    pub format_version: ScenarioFormatVersion,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Configuration to apply before loading; `None` keeps the current one
    #[serde(default)]
    pub config: Option<SimConfig>,
    pub processes: Vec<ScenarioProcess>,
}

impl Scenario {
    pub fn new(name: &str, processes: Vec<ScenarioProcess>) -> Self {
        Self {
            format_version: ScenarioFormatVersion::CURRENT,
            name: name.to_string(),
            description: String::new(),
            config: None,
            processes,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.format_version.major != ScenarioFormatVersion::CURRENT.major {
            return Err(ScenarioError::UnsupportedVersion(self.format_version));
        }
        if self.name.trim().is_empty() {
            return Err(ScenarioError::Invalid(
                "Scenario name cannot be empty".to_string(),
            ));
        }
        if self.processes.is_empty() {
            return Err(ScenarioError::Invalid(format!(
                "Scenario {} has no processes",
                self.name
            )));
        }
        if let Some(config) = &self.config {
            config.validate()?;
        }

        let mut names = HashSet::new();
        for process in &self.processes {
            if !names.insert(process.name.trim()) {
                return Err(ScenarioError::DuplicateProcessName(process.name.clone()));
            }
            process.to_spec()?;
        }

        Ok(())
    }

    /// Process definitions in file order
    pub fn specs(&self) -> Result<Vec<ProcessSpec>, ScenarioError> {
        self.processes.iter().map(ScenarioProcess::to_spec).collect()
    }

    /// Replaces the simulator's workload with this scenario
    ///
    /// Everything is validated first; on error the simulator is unchanged.
    pub fn apply(&self, sim: &mut Simulator) -> Result<Vec<ProcessId>, ScenarioError> {
        self.validate()?;
        let specs = self.specs()?;
        sim.reset();
        if let Some(config) = &self.config {
            sim.configure(config.clone())?;
        }
        Ok(sim.load_processes(specs)?)
    }

    /// Builds a fresh simulator with this scenario loaded
    ///
    /// Scenarios without a configuration get the default one.
    pub fn instantiate(&self) -> Result<Simulator, ScenarioError> {
        let mut sim = Simulator::with_config(self.config.clone().unwrap_or_default())?;
        self.apply(&mut sim)?;
        Ok(sim)
    }

    pub fn to_json_pretty(&self) -> Result<String, ScenarioError> {
        serde_json::to_string_pretty(self).map_err(|err| ScenarioError::Parse(err.to_string()))
    }
}

/// Errors related to loading or validating scenarios.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Scenario file not found: {0}")]
    NotFound(String),

    #[error("Failed to read scenario: {0}")]
    Io(String),

    #[error("Failed to parse scenario: {0}")]
    Parse(String),

    #[error("Unsupported scenario format version {}.{}", .0.major, .0.minor)]
    UnsupportedVersion(ScenarioFormatVersion),

    #[error("Invalid scenario: {0}")]
    Invalid(String),

    #[error("Duplicate process name: {0}")]
    DuplicateProcessName(String),

    #[error("Process {process}: {source}")]
    Pattern {
        process: String,
        source: BurstPatternError,
    },

    #[error(transparent)]
    Sim(#[from] SimError),
}

/// Loads scenario files from disk.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::NotFound(path.display().to_string()));
        }
        let data = fs::read_to_string(path).map_err(|err| ScenarioError::Io(err.to_string()))?;
        Self::from_str(&data)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(data: &str) -> Result<Scenario, ScenarioError> {
        let scenario: Scenario =
            serde_json::from_str(data).map_err(|err| ScenarioError::Parse(err.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn save_to_path(scenario: &Scenario, path: impl AsRef<Path>) -> Result<(), ScenarioError> {
        scenario.validate()?;
        fs::write(path.as_ref(), scenario.to_json_pretty()?)
            .map_err(|err| ScenarioError::Io(err.to_string()))
    }
}
