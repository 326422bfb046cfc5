//! Built-in workloads

use crate::{Scenario, ScenarioProcess};
use sched_types::Algorithm;
use sim_scheduler::SimConfig;

/// Every built-in scenario, in menu order
pub fn presets() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "Basic FCFS",
            vec![
                ScenarioProcess::new("P1", 0, 1, "CPU(5)"),
                ScenarioProcess::new("P2", 1, 1, "CPU(3)"),
                ScenarioProcess::new("P3", 2, 1, "CPU(4)"),
            ],
        )
        .with_description("Three CPU-bound jobs arriving one tick apart")
        .with_config(SimConfig::for_algorithm(Algorithm::Fcfs)),
        Scenario::new(
            "Preemption Demo",
            vec![
                ScenarioProcess::new("P1", 0, 3, "CPU(8)"),
                ScenarioProcess::new("P2", 2, 1, "CPU(4)"),
                ScenarioProcess::new("P3", 4, 2, "CPU(2)"),
            ],
        )
        .with_description("A long job interrupted by shorter, more urgent arrivals")
        .with_config(SimConfig::for_algorithm(Algorithm::PriorityPreemptive)),
        Scenario::new(
            "I/O Bound",
            vec![
                ScenarioProcess::new("P1", 0, 1, "CPU(3) -> IO(2) -> CPU(2)"),
                ScenarioProcess::new("P2", 1, 2, "CPU(2) -> IO(3) -> CPU(3)"),
                ScenarioProcess::new("P3", 2, 1, "CPU(4)"),
            ],
        )
        .with_description("Interleaved CPU and I/O bursts sharing one core")
        .with_config(SimConfig::for_algorithm(Algorithm::RoundRobin).with_quantum(2)),
        Scenario::new(
            "Multi-Core Load",
            vec![
                ScenarioProcess::new("P1", 0, 1, "CPU(6)"),
                ScenarioProcess::new("P2", 0, 2, "CPU(4)"),
                ScenarioProcess::new("P3", 0, 1, "CPU(5)"),
                ScenarioProcess::new("P4", 0, 3, "CPU(3)"),
            ],
        )
        .with_description("Four simultaneous arrivals spread over two cores")
        .with_config(SimConfig::for_algorithm(Algorithm::Fcfs).with_cores(2)),
    ]
}

/// Names of the built-in scenarios
pub fn preset_names() -> Vec<String> {
    presets().into_iter().map(|s| s.name).collect()
}

/// Looks up a preset by name, ignoring case and surrounding whitespace
pub fn find_preset(name: &str) -> Option<Scenario> {
    let wanted = name.trim();
    presets()
        .into_iter()
        .find(|s| s.name.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_types::CoreId;

    #[test]
    fn test_every_preset_is_valid() {
        for preset in presets() {
            assert!(preset.validate().is_ok(), "{}", preset.name);
        }
        assert_eq!(preset_names().len(), 4);
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find_preset(" basic fcfs ").unwrap().name, "Basic FCFS");
        assert_eq!(find_preset("I/O BOUND").unwrap().processes.len(), 3);
        assert!(find_preset("lottery").is_none());
    }

    #[test]
    fn test_every_preset_runs_to_completion() {
        for preset in presets() {
            let mut sim = preset.instantiate().unwrap();
            sim.run_to_completion(1_000);
            assert!(sim.is_finished(), "{}", preset.name);
        }
    }

    #[test]
    fn test_basic_fcfs_schedule() {
        let mut sim = find_preset("Basic FCFS").unwrap().instantiate().unwrap();
        sim.run_to_completion(100);
        let completions: Vec<_> = sim.processes().iter().map(|p| p.completion_time).collect();
        assert_eq!(completions, vec![Some(5), Some(8), Some(12)]);
    }

    #[test]
    fn test_multi_core_load_uses_both_cores() {
        let mut sim = find_preset("Multi-Core Load").unwrap().instantiate().unwrap();
        sim.step();
        let on_core = |core: usize| {
            sim.processes()
                .iter()
                .filter(|p| p.assigned_core == Some(CoreId(core)))
                .count()
        };
        assert_eq!(on_core(0), 2);
        assert_eq!(on_core(1), 2);
    }
}
