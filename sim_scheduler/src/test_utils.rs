//! Test utilities for scheduling scenarios
//!
//! Helpers shared by unit tests, the integration tests under `tests/` and
//! downstream crates that need a quick workload.

use crate::{SimConfig, SimError, Simulator};
use sched_types::{CoreId, ProcessId, ProcessSpec, Tick};

/// Shorthand for a CPU-only process
pub fn cpu_job(name: &str, arrival_time: Tick, priority: u32, burst: u32) -> ProcessSpec {
    ProcessSpec::new(
        name,
        arrival_time,
        priority,
        vec![sched_types::Burst::cpu(burst)],
    )
}

/// Builds a simulator, loads `specs` and runs it to completion
///
/// `max_ticks` bounds the run so a misbehaving policy cannot hang a test.
pub fn run_workload(
    config: SimConfig,
    specs: Vec<ProcessSpec>,
    max_ticks: u64,
) -> Result<Simulator, SimError> {
    let mut sim = Simulator::with_config(config)?;
    sim.load_processes(specs)?;
    sim.run_to_completion(max_ticks);
    Ok(sim)
}

/// Completion time of every process, in insertion order
pub fn completion_times(sim: &Simulator) -> Vec<(String, Option<Tick>)> {
    sim.processes()
        .iter()
        .map(|p| (p.name.clone(), p.completion_time))
        .collect()
}

/// Occupant of a core during each tick `[0, clock)`
///
/// Flattens the Gantt history so tests can compare whole timelines.
pub fn timeline(sim: &Simulator, core: CoreId) -> Vec<Option<ProcessId>> {
    sim.cores()
        .get(core.index())
        .map(|c| {
            c.gantt
                .iter()
                .flat_map(|s| (s.start..s.end).map(move |_| s.process))
                .collect()
        })
        .unwrap_or_default()
}

/// Same as [`timeline`] but rendered as process names, with `-` for idle
pub fn timeline_names(sim: &Simulator, core: CoreId) -> Vec<String> {
    timeline(sim, core)
        .into_iter()
        .map(|slot| match slot.and_then(|id| sim.process(id)) {
            Some(p) => p.name.clone(),
            None => "-".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_workload_and_timeline() {
        let sim = run_workload(
            SimConfig::default(),
            vec![cpu_job("A", 0, 1, 2), cpu_job("B", 3, 1, 1)],
            50,
        )
        .unwrap();
        assert_eq!(
            completion_times(&sim),
            vec![("A".to_string(), Some(2)), ("B".to_string(), Some(4))]
        );
        assert_eq!(timeline_names(&sim, CoreId(0)), vec!["A", "A", "-", "B"]);
    }

    #[test]
    fn test_run_workload_rejects_bad_config() {
        let result = run_workload(SimConfig::default().with_cores(0), vec![], 10);
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }
}
