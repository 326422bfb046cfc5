//! Starvation prevention by priority aging.

use sched_log::{EventKind, SchedulerEvent};
use sched_types::{Process, ProcessState, Tick};

/// Boosts every READY process that has waited at least `threshold` ticks
///
/// A boost lowers the priority value by one, never below zero, and restarts
/// the wait measurement at `clock`. Processes already at priority 0 are left
/// alone and keep accumulating wait.
pub fn apply(processes: &mut [Process], clock: Tick, threshold: u64) -> Vec<SchedulerEvent> {
    let mut events = Vec::new();
    for process in processes
        .iter_mut()
        .filter(|p| p.state == ProcessState::Ready && p.priority > 0)
    {
        let Some(waited) = process.wait_duration(clock) else {
            continue;
        };
        if waited < threshold {
            continue;
        }

        let old = process.priority;
        process.priority = old - 1;
        process.waiting_since = Some(clock);

        let mut event = SchedulerEvent::new(
            clock,
            EventKind::AgingBoost,
            format!(
                "{} priority boosted from {} to {} after waiting {} ticks",
                process.name, old, process.priority, waited
            ),
        )
        .with_process(process.id);
        if let Some(core) = process.assigned_core {
            event = event.with_core(core);
        }
        events.push(event);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_types::{ProcessId, ProcessSpec};

    fn ready(seq: u32, priority: u32, since: Tick) -> Process {
        let spec = ProcessSpec::from_pattern(format!("P{}", seq), 0, priority, "CPU(5)").unwrap();
        let mut p = Process::from_spec(ProcessId::new(seq), "#FF6B6B", spec);
        p.state = ProcessState::Ready;
        p.waiting_since = Some(since);
        p
    }

    #[test]
    fn test_boost_after_threshold() {
        let mut processes = vec![ready(1, 10, 0)];
        assert!(apply(&mut processes, 4, 5).is_empty());

        let events = apply(&mut processes, 5, 5);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::AgingBoost);
        assert_eq!(processes[0].priority, 9);
        assert_eq!(processes[0].waiting_since, Some(5));
        assert_eq!(processes[0].base_priority, 10);
    }

    #[test]
    fn test_measurement_restarts_after_boost() {
        let mut processes = vec![ready(1, 10, 0)];
        apply(&mut processes, 5, 5);
        assert!(apply(&mut processes, 9, 5).is_empty());
        assert_eq!(apply(&mut processes, 10, 5).len(), 1);
        assert_eq!(processes[0].priority, 8);
    }

    #[test]
    fn test_priority_floor() {
        let mut processes = vec![ready(1, 0, 0)];
        assert!(apply(&mut processes, 50, 5).is_empty());
        assert_eq!(processes[0].priority, 0);
    }

    #[test]
    fn test_only_ready_processes_age() {
        let mut processes = vec![ready(1, 4, 0)];
        processes[0].state = ProcessState::Running;
        assert!(apply(&mut processes, 50, 5).is_empty());
        assert_eq!(processes[0].priority, 4);
    }
}
