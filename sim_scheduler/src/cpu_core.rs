//! Per-core state: occupant, ready queue, quantum and Gantt history.

use sched_types::{CoreId, ProcessId, Tick, IDLE_COLOR};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One contiguous run of a single occupant (or idleness) on a core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanttSegment {
    /// `None` marks an idle segment
    pub process: Option<ProcessId>,
    pub start: Tick,
    /// Exclusive end
    pub end: Tick,
    pub color: String,
}

impl GanttSegment {
    pub fn busy(process: ProcessId, color: impl Into<String>, start: Tick, end: Tick) -> Self {
        Self {
            process: Some(process),
            start,
            end,
            color: color.into(),
        }
    }

    pub fn idle(start: Tick, end: Tick) -> Self {
        Self {
            process: None,
            start,
            end,
            color: IDLE_COLOR.to_string(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.process.is_none()
    }

    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

/// A simulated processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuCore {
    pub id: CoreId,
    /// Process occupying the core, if any
    pub current: Option<ProcessId>,
    /// Processes bound to this core, in FIFO arrival order
    pub ready_queue: VecDeque<ProcessId>,
    /// Ticks left in the occupant's time slice
    pub quantum_remaining: u32,
    pub gantt: Vec<GanttSegment>,
}

impl CpuCore {
    pub fn new(id: CoreId) -> Self {
        Self {
            id,
            current: None,
            ready_queue: VecDeque::new(),
            quantum_remaining: 0,
            gantt: Vec::new(),
        }
    }

    /// Load metric used for arrival placement
    pub fn load(&self) -> usize {
        self.ready_queue.len() + usize::from(self.current.is_some())
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Appends to the ready queue
    pub fn enqueue(&mut self, process: ProcessId) {
        self.ready_queue.push_back(process);
    }

    /// Removes a process from the ready queue, wherever it sits
    pub fn dequeue(&mut self, process: ProcessId) -> bool {
        let before = self.ready_queue.len();
        self.ready_queue.retain(|&p| p != process);
        self.ready_queue.len() != before
    }

    /// Opens a fresh busy segment covering `[start, start + 1)`
    pub fn open_segment(&mut self, process: ProcessId, color: &str, start: Tick) {
        self.gantt
            .push(GanttSegment::busy(process, color, start, start.saturating_add(1)));
    }

    /// Extends the occupant's segment through `end`
    ///
    /// Falls back to opening a new segment if the last one does not belong to
    /// `process` or does not end where this tick starts.
    pub fn extend_segment(&mut self, process: ProcessId, color: &str, start: Tick) {
        let end = start.saturating_add(1);
        match self.gantt.last_mut() {
            Some(last) if last.process == Some(process) && last.end == start => last.end = end,
            _ => self.open_segment(process, color, start),
        }
    }

    /// Records one idle tick starting at `start`
    pub fn record_idle(&mut self, start: Tick) {
        let end = start.saturating_add(1);
        match self.gantt.last_mut() {
            Some(last) if last.is_idle() && last.end == start => last.end = end,
            _ => self.gantt.push(GanttSegment::idle(start, end)),
        }
    }

    /// Total ticks this core spent running something
    pub fn busy_ticks(&self) -> u64 {
        self.gantt
            .iter()
            .filter(|s| !s.is_idle())
            .map(GanttSegment::duration)
            .sum()
    }

    pub fn idle_ticks(&self) -> u64 {
        self.gantt
            .iter()
            .filter(|s| s.is_idle())
            .map(GanttSegment::duration)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_core_is_idle() {
        let core = CpuCore::new(CoreId(1));
        assert!(core.is_idle());
        assert_eq!(core.load(), 0);
        assert!(core.gantt.is_empty());
    }

    #[test]
    fn test_load_counts_occupant() {
        let mut core = CpuCore::new(CoreId(0));
        core.enqueue(ProcessId::new(1));
        core.enqueue(ProcessId::new(2));
        assert_eq!(core.load(), 2);
        core.current = Some(ProcessId::new(3));
        assert_eq!(core.load(), 3);
    }

    #[test]
    fn test_dequeue_from_middle() {
        let mut core = CpuCore::new(CoreId(0));
        for n in 1..=3 {
            core.enqueue(ProcessId::new(n));
        }
        assert!(core.dequeue(ProcessId::new(2)));
        assert!(!core.dequeue(ProcessId::new(2)));
        assert_eq!(
            core.ready_queue.iter().copied().collect::<Vec<_>>(),
            vec![ProcessId::new(1), ProcessId::new(3)]
        );
    }

    #[test]
    fn test_segments_merge_contiguous_ticks() {
        let mut core = CpuCore::new(CoreId(0));
        let p1 = ProcessId::new(1);
        core.record_idle(0);
        core.record_idle(1);
        core.open_segment(p1, "#FF6B6B", 2);
        core.extend_segment(p1, "#FF6B6B", 3);
        core.extend_segment(p1, "#FF6B6B", 4);

        assert_eq!(core.gantt.len(), 2);
        assert_eq!(core.gantt[0], GanttSegment::idle(0, 2));
        assert_eq!(core.gantt[1], GanttSegment::busy(p1, "#FF6B6B", 2, 5));
        assert_eq!(core.busy_ticks(), 3);
        assert_eq!(core.idle_ticks(), 2);
    }

    #[test]
    fn test_reselected_process_gets_new_segment() {
        let mut core = CpuCore::new(CoreId(0));
        let p1 = ProcessId::new(1);
        core.open_segment(p1, "#FF6B6B", 0);
        core.open_segment(p1, "#FF6B6B", 1);
        assert_eq!(core.gantt.len(), 2);
    }

    #[test]
    fn test_idle_segment_color() {
        assert_eq!(GanttSegment::idle(0, 1).color, IDLE_COLOR);
    }
}
