//! Shared I/O device
//!
//! Every WAITING process progresses its I/O burst concurrently, one unit per
//! tick. The device keeps entry order so completions are handled
//! deterministically.

use sched_types::{Process, ProcessId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoDevice {
    queue: Vec<ProcessId>,
}

impl IoDevice {
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    pub fn enqueue(&mut self, process: ProcessId) {
        if !self.queue.contains(&process) {
            self.queue.push(process);
        }
    }

    pub fn remove(&mut self, process: ProcessId) {
        self.queue.retain(|&p| p != process);
    }

    pub fn contains(&self, process: ProcessId) -> bool {
        self.queue.contains(&process)
    }

    /// Processes currently on the device, in entry order
    pub fn processes(&self) -> &[ProcessId] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Device processes whose I/O burst has run out
    pub fn finished(&self, processes: &[Process]) -> Vec<ProcessId> {
        self.queue
            .iter()
            .copied()
            .filter(|&id| {
                processes
                    .iter()
                    .find(|p| p.id == id)
                    .and_then(Process::remaining_in_current_burst)
                    == Some(0)
            })
            .collect()
    }

    /// Advances every device process by one unit of I/O
    pub fn progress(&self, processes: &mut [Process]) {
        for process in processes.iter_mut().filter(|p| self.queue.contains(&p.id)) {
            if let Some(burst) = process.current_burst_mut() {
                burst.advance();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_types::ProcessSpec;

    fn waiting(id: u32, pattern: &str) -> Process {
        let spec = ProcessSpec::from_pattern(format!("P{}", id), 0, 1, pattern).unwrap();
        Process::from_spec(ProcessId::new(id), "#4ECDC4", spec)
    }

    #[test]
    fn test_enqueue_is_idempotent() {
        let mut device = IoDevice::new();
        device.enqueue(ProcessId::new(1));
        device.enqueue(ProcessId::new(1));
        assert_eq!(device.len(), 1);
    }

    #[test]
    fn test_progress_is_concurrent() {
        let mut processes = vec![waiting(1, "IO(2)"), waiting(2, "IO(1)"), waiting(3, "IO(5)")];
        let mut device = IoDevice::new();
        device.enqueue(ProcessId::new(1));
        device.enqueue(ProcessId::new(2));

        device.progress(&mut processes);

        assert_eq!(processes[0].remaining_in_current_burst(), Some(1));
        assert_eq!(processes[1].remaining_in_current_burst(), Some(0));
        // not on the device
        assert_eq!(processes[2].remaining_in_current_burst(), Some(5));
        assert_eq!(device.finished(&processes), vec![ProcessId::new(2)]);
    }

    #[test]
    fn test_remove() {
        let mut device = IoDevice::new();
        device.enqueue(ProcessId::new(1));
        device.remove(ProcessId::new(1));
        assert!(device.is_empty());
        assert!(!device.contains(ProcessId::new(1)));
    }
}
