//! Aggregate performance metrics.

use crate::cpu_core::CpuCore;
use sched_types::{Process, Tick};
use serde::{Deserialize, Serialize};

/// Aggregates recomputed from scratch after every tick
///
/// Averages and throughput only cover completed processes and stay at zero
/// until the first completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    pub avg_response_time: f64,
    /// Busy share of all core-ticks, in percent
    pub cpu_utilization: f64,
    /// Completed processes per tick
    pub throughput: f64,
    pub total_processes: usize,
    pub completed_processes: usize,
    pub busy_ticks: u64,
    pub idle_ticks: u64,
}

impl Metrics {
    pub fn compute(processes: &[Process], cores: &[CpuCore], clock: Tick) -> Self {
        let busy_ticks: u64 = cores.iter().map(CpuCore::busy_ticks).sum();
        let idle_ticks: u64 = cores.iter().map(CpuCore::idle_ticks).sum();
        let capacity = clock.saturating_mul(cores.len() as u64);
        let cpu_utilization = if capacity > 0 {
            busy_ticks as f64 / capacity as f64 * 100.0
        } else {
            0.0
        };

        let completed: Vec<&Process> = processes.iter().filter(|p| p.is_terminated()).collect();
        let mut metrics = Self {
            cpu_utilization,
            total_processes: processes.len(),
            completed_processes: completed.len(),
            busy_ticks,
            idle_ticks,
            ..Self::default()
        };
        if completed.is_empty() {
            return metrics;
        }

        let count = completed.len() as f64;
        metrics.avg_waiting_time = completed.iter().map(|p| p.wait_time as f64).sum::<f64>() / count;
        metrics.avg_turnaround_time =
            completed.iter().map(|p| p.turnaround_time as f64).sum::<f64>() / count;
        let responses: Vec<f64> = completed
            .iter()
            .filter_map(|p| p.response_time)
            .map(|r| r as f64)
            .collect();
        if !responses.is_empty() {
            metrics.avg_response_time = responses.iter().sum::<f64>() / responses.len() as f64;
        }
        if clock > 0 {
            metrics.throughput = count / clock as f64;
        }
        metrics
    }

    pub fn all_completed(&self) -> bool {
        self.total_processes > 0 && self.completed_processes == self.total_processes
    }
}
