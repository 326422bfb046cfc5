//! Question triggers
//!
//! A trigger looks at the simulator just before the next tick and decides
//! whether that tick is worth a question. The correct answer is read from a
//! preview: a clone of the state advanced by the real tick engine.

use crate::question::{QuizKind, QuizQuestion};
use crate::roll::TriggerRoll;
use sched_log::{EventKind, SchedulerEvent};
use sched_types::{Algorithm, CoreId, Process, ProcessId, ProcessState, Tick};
use sim_scheduler::engine::{self, SimState};
use sim_scheduler::Simulator;

pub const PREEMPT_YES: &str = "Yes, preempt";
pub const PREEMPT_NO: &str = "No, continue";

/// Default odds of asking a next-process question when one is available
pub const NEXT_PROCESS_CHANCE: f64 = 0.5;

const MAX_OPTIONS: usize = 4;

/// The upcoming tick, before and after
struct Preview<'a> {
    before: &'a SimState,
    after: SimState,
    algorithm: Algorithm,
    time_quantum: u32,
}

impl<'a> Preview<'a> {
    fn new(sim: &'a Simulator) -> Self {
        let before = sim.state();
        Self {
            before,
            after: engine::advance(before.clone(), sim.config()),
            algorithm: sim.config().algorithm,
            time_quantum: sim.config().time_quantum,
        }
    }

    fn now(&self) -> Tick {
        self.before.now()
    }

    fn events_on(&self, core: CoreId) -> impl Iterator<Item = &SchedulerEvent> {
        self.after
            .events
            .at_tick(self.now())
            .filter(move |e| e.core == Some(core))
    }

    /// Process that took `core` this tick through an event of `kind`
    fn taken_by(&self, core: CoreId, kind: EventKind) -> Option<ProcessId> {
        self.events_on(core)
            .find(|e| e.kind == kind)
            .and_then(|e| e.process)
    }

    fn ready_on(&self, core: usize) -> Vec<&'a Process> {
        let before = self.before;
        before.cores[core]
            .ready_queue
            .iter()
            .filter_map(|&id| before.process(id))
            .filter(|p| p.state == ProcessState::Ready)
            .collect()
    }
}

/// Decides when to interrupt a run with a question
#[derive(Debug, Clone)]
pub struct QuizTrigger {
    next_process_chance: f64,
}

impl QuizTrigger {
    pub fn new() -> Self {
        Self {
            next_process_chance: NEXT_PROCESS_CHANCE,
        }
    }

    pub fn with_next_process_chance(mut self, chance: f64) -> Self {
        self.next_process_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Returns a question about the tick the simulator is about to run
    ///
    /// Checked in order: preemption by an arrival, next process on a freshly
    /// idle core, round robin quantum expiry. The simulator is not touched.
    pub fn check(&self, sim: &Simulator, roll: &mut dyn TriggerRoll) -> Option<QuizQuestion> {
        if sim.processes().is_empty() || sim.is_finished() {
            return None;
        }

        let preview = Preview::new(sim);
        preemption(&preview)
            .or_else(|| self.next_process(&preview, roll))
            .or_else(|| quantum_expiry(&preview))
    }

    fn next_process(&self, preview: &Preview<'_>, roll: &mut dyn TriggerRoll) -> Option<QuizQuestion> {
        let now = preview.now();

        for (index, core) in preview.before.cores.iter().enumerate() {
            if core.current.is_some() {
                continue;
            }
            let just_freed = core
                .gantt
                .last()
                .map_or(false, |s| !s.is_idle() && s.end == now);
            if !just_freed {
                continue;
            }

            let ready = preview.ready_on(index);
            if ready.len() < 2 {
                continue;
            }
            let disturbed = preview
                .events_on(core.id)
                .any(|e| matches!(e.kind, EventKind::Arrival | EventKind::IoComplete));
            if disturbed {
                continue;
            }
            let Some(winner) = preview
                .taken_by(core.id, EventKind::Start)
                .and_then(|id| ready.iter().copied().find(|p| p.id == id))
            else {
                continue;
            };

            if !roll.chance(self.next_process_chance) {
                return None;
            }

            let names: Vec<&str> = ready.iter().map(|p| p.name.as_str()).collect();
            let mut options: Vec<String> = names
                .iter()
                .take(MAX_OPTIONS)
                .map(|n| n.to_string())
                .collect();
            if !options.contains(&winner.name) {
                if let Some(last) = options.last_mut() {
                    *last = winner.name.clone();
                }
            }

            let question = QuizQuestion::new(
                QuizKind::NextProcess,
                now,
                preview.algorithm,
                format!(
                    "{} is idle and its ready queue has: {}. Which process runs next?",
                    core.id,
                    names.join(", ")
                ),
                options,
                winner.name.clone(),
                next_process_explanation(preview, winner),
            );
            return Some(question);
        }

        None
    }
}

impl Default for QuizTrigger {
    fn default() -> Self {
        Self::new()
    }
}

fn preemption(preview: &Preview<'_>) -> Option<QuizQuestion> {
    if !matches!(
        preview.algorithm,
        Algorithm::Srtf | Algorithm::PriorityPreemptive
    ) {
        return None;
    }
    let now = preview.now();

    let arrivals = preview
        .before
        .processes
        .iter()
        .filter(|p| p.state == ProcessState::New && p.arrival_time == now)
        .filter(|p| p.current_burst().map_or(false, |b| b.is_cpu()));

    for arriving in arrivals {
        let Some(core) = preview.after.process(arriving.id).and_then(|p| p.assigned_core) else {
            continue;
        };
        let Some(occupant) = preview.before.cores[core.index()]
            .current
            .and_then(|id| preview.before.process(id))
        else {
            continue;
        };

        // Skip ticks where somebody else takes the core
        let took_over = match preview.taken_by(core, EventKind::ContextSwitch) {
            Some(id) if id == arriving.id => true,
            Some(_) => continue,
            None => false,
        };

        let (question, explanation) = match preview.algorithm {
            Algorithm::Srtf => srtf_text(arriving, occupant, core, took_over),
            _ => priority_text(arriving, occupant, core, took_over),
        };
        let correct = if took_over { PREEMPT_YES } else { PREEMPT_NO };

        return Some(
            QuizQuestion::new(
                QuizKind::Preemption,
                now,
                preview.algorithm,
                question,
                vec![PREEMPT_YES.to_string(), PREEMPT_NO.to_string()],
                correct.to_string(),
                explanation,
            )
            .with_current(&occupant.name)
            .with_arriving(&arriving.name),
        );
    }

    None
}

fn srtf_text(arriving: &Process, occupant: &Process, core: CoreId, took_over: bool) -> (String, String) {
    let incoming = arriving.remaining_in_current_burst().unwrap_or(0);
    let outgoing = occupant.remaining_in_current_burst().unwrap_or(0);
    let question = format!(
        "{} has arrived with {} units remaining. {} has {} units left on {}. Should the CPU preempt {}?",
        arriving.name, incoming, occupant.name, outgoing, core, occupant.name
    );
    let explanation = if took_over {
        format!(
            "In SRTF, the process with the shortest remaining time always runs. {} ({} units) < {} ({} units), so preemption occurs.",
            arriving.name, incoming, occupant.name, outgoing
        )
    } else {
        format!(
            "In SRTF, only a strictly shorter remaining time preempts. {} ({} units) is not shorter than {} ({} units), so {} keeps the CPU.",
            arriving.name, incoming, occupant.name, outgoing, occupant.name
        )
    };
    (question, explanation)
}

fn priority_text(arriving: &Process, occupant: &Process, core: CoreId, took_over: bool) -> (String, String) {
    let question = format!(
        "{} (priority {}) has arrived. {} (priority {}) is running on {}. Should preemption occur?",
        arriving.name, arriving.priority, occupant.name, occupant.priority, core
    );
    let explanation = if took_over {
        format!(
            "In Priority Preemptive, lower priority numbers mean higher priority. {} ({}) has higher priority than {} ({}).",
            arriving.name, arriving.priority, occupant.name, occupant.priority
        )
    } else {
        format!(
            "In Priority Preemptive, only a strictly lower priority number preempts. {} ({}) does not beat {} ({}).",
            arriving.name, arriving.priority, occupant.name, occupant.priority
        )
    };
    (question, explanation)
}

fn next_process_explanation(preview: &Preview<'_>, winner: &Process) -> String {
    // Aging may have touched the priority during the tick itself
    let priority = preview
        .after
        .process(winner.id)
        .map_or(winner.priority, |p| p.priority);

    match preview.algorithm {
        Algorithm::Fcfs => format!(
            "In FCFS, the process that arrived first runs next. {} arrived at time {}.",
            winner.name, winner.arrival_time
        ),
        Algorithm::Sjf | Algorithm::Srtf => format!(
            "In {}, the process with the shortest (remaining) burst runs next. {} has {} units.",
            preview.algorithm.short_name(),
            winner.name,
            winner.remaining_in_current_burst().unwrap_or(0)
        ),
        Algorithm::PriorityPreemptive | Algorithm::PriorityNonPreemptive => format!(
            "In Priority scheduling, the lowest priority number runs first. {} has priority {}.",
            winner.name, priority
        ),
        Algorithm::RoundRobin => format!(
            "In Round Robin, processes run in FIFO order within the ready queue. {} is at the front.",
            winner.name
        ),
        Algorithm::Mlfq => format!(
            "In MLFQ, the highest non-empty queue runs first, in FIFO order within it. {} is at the front of Q{}.",
            winner.name, winner.queue_level
        ),
    }
}

fn quantum_expiry(preview: &Preview<'_>) -> Option<QuizQuestion> {
    if preview.algorithm != Algorithm::RoundRobin {
        return None;
    }

    for (index, core) in preview.before.cores.iter().enumerate() {
        let Some(occupant) = core.current.and_then(|id| preview.before.process(id)) else {
            continue;
        };
        // The quantum is charged at the start of the tick
        if core.quantum_remaining > 1 || preview.ready_on(index).is_empty() {
            continue;
        }
        let remaining = occupant.remaining_in_current_burst().unwrap_or(0);
        if remaining == 0 {
            continue;
        }

        let back = format!("{} goes to back of queue", occupant.name);
        let stays = format!("{} continues running", occupant.name);
        let ends = format!("{} terminates", occupant.name);
        let (correct, explanation) = match preview.after.process(occupant.id).map(|p| p.state) {
            Some(ProcessState::Ready) => (
                back.clone(),
                "In Round Robin, when the time quantum expires, the process is moved to the back of the ready queue if it still has work remaining.".to_string(),
            ),
            Some(ProcessState::Terminated) => (
                ends.clone(),
                format!("{} finishes its last burst before anyone else gets a turn.", occupant.name),
            ),
            _ => (
                stays.clone(),
                format!("Nobody else can use {} this tick, so {} keeps running.", core.id, occupant.name),
            ),
        };

        return Some(
            QuizQuestion::new(
                QuizKind::QuantumExpiry,
                preview.now(),
                preview.algorithm,
                format!(
                    "Time quantum ({}) has expired for {}. It has {} units remaining. What happens next?",
                    preview.time_quantum, occupant.name, remaining
                ),
                vec![back, stays, ends],
                correct,
                explanation,
            )
            .with_current(&occupant.name),
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::FixedRoll;
    use sim_scheduler::SimConfig;

    fn sim(config: SimConfig, jobs: &[(&str, Tick, u32, &str)]) -> Simulator {
        let mut sim = Simulator::with_config(config).unwrap();
        for (name, arrival, priority, pattern) in jobs {
            sim.add_process_from_pattern(name, *arrival, *priority, pattern)
                .unwrap();
        }
        sim
    }

    fn steps(sim: &mut Simulator, n: usize) {
        for _ in 0..n {
            sim.step();
        }
    }

    #[test]
    fn test_srtf_preemption_question() {
        let mut sim = sim(
            SimConfig::for_algorithm(Algorithm::Srtf),
            &[("A", 0, 1, "CPU(8)"), ("B", 2, 1, "CPU(3)")],
        );
        steps(&mut sim, 2);

        let q = QuizTrigger::new().check(&sim, &mut FixedRoll(false)).unwrap();
        assert_eq!(q.kind, QuizKind::Preemption);
        assert_eq!(q.correct_answer, PREEMPT_YES);
        assert_eq!(q.current_process.as_deref(), Some("A"));
        assert_eq!(q.arriving_process.as_deref(), Some("B"));
        assert_eq!(q.tick, 2);
        assert!(q.explanation.contains("B (3 units) < A (6 units)"));

        sim.step();
        assert_eq!(sim.cores()[0].current, sim.process_by_name("B").map(|p| p.id));
    }

    #[test]
    fn test_srtf_longer_arrival_does_not_preempt() {
        let mut sim = sim(
            SimConfig::for_algorithm(Algorithm::Srtf),
            &[("A", 0, 1, "CPU(8)"), ("B", 2, 1, "CPU(7)")],
        );
        steps(&mut sim, 2);

        let q = QuizTrigger::new().check(&sim, &mut FixedRoll(false)).unwrap();
        assert_eq!(q.correct_answer, PREEMPT_NO);
        assert!(q.is_correct("No, continue"));
    }

    #[test]
    fn test_priority_preemption_question() {
        let mut sim = sim(
            SimConfig::for_algorithm(Algorithm::PriorityPreemptive),
            &[("A", 0, 3, "CPU(8)"), ("B", 2, 1, "CPU(4)")],
        );
        steps(&mut sim, 2);

        let q = QuizTrigger::new().check(&sim, &mut FixedRoll(false)).unwrap();
        assert_eq!(q.kind, QuizKind::Preemption);
        assert_eq!(q.correct_answer, PREEMPT_YES);
        assert!(q.question.contains("B (priority 1)"));
    }

    #[test]
    fn test_non_preemptive_arrival_is_quiet() {
        let mut sim = sim(
            SimConfig::for_algorithm(Algorithm::Fcfs),
            &[("A", 0, 1, "CPU(8)"), ("B", 2, 1, "CPU(3)")],
        );
        steps(&mut sim, 2);
        assert!(QuizTrigger::new().check(&sim, &mut FixedRoll(true)).is_none());
    }

    #[test]
    fn test_next_process_after_completion() {
        let mut sim = sim(
            SimConfig::for_algorithm(Algorithm::Sjf),
            &[("A", 0, 1, "CPU(2)"), ("B", 1, 1, "CPU(3)"), ("C", 1, 1, "CPU(1)")],
        );
        steps(&mut sim, 2);

        let q = QuizTrigger::new().check(&sim, &mut FixedRoll(true)).unwrap();
        assert_eq!(q.kind, QuizKind::NextProcess);
        assert_eq!(q.correct_answer, "C");
        assert_eq!(q.options, vec!["B".to_string(), "C".to_string()]);
        assert!(q.explanation.contains("C has 1 units"));

        sim.step();
        assert_eq!(sim.process_by_name("C").unwrap().start_time, Some(2));
    }

    #[test]
    fn test_next_process_respects_roll() {
        let mut sim = sim(
            SimConfig::for_algorithm(Algorithm::Sjf),
            &[("A", 0, 1, "CPU(2)"), ("B", 1, 1, "CPU(3)"), ("C", 1, 1, "CPU(1)")],
        );
        steps(&mut sim, 2);
        assert!(QuizTrigger::new().check(&sim, &mut FixedRoll(false)).is_none());
    }

    #[test]
    fn test_quantum_expiry_question() {
        let mut sim = sim(
            SimConfig::for_algorithm(Algorithm::RoundRobin).with_quantum(2),
            &[("A", 0, 1, "CPU(5)"), ("B", 0, 1, "CPU(3)")],
        );
        sim.step();
        assert!(QuizTrigger::new().check(&sim, &mut FixedRoll(true)).is_none());

        sim.step();
        let q = QuizTrigger::new().check(&sim, &mut FixedRoll(true)).unwrap();
        assert_eq!(q.kind, QuizKind::QuantumExpiry);
        assert_eq!(q.correct_answer, "A goes to back of queue");
        assert_eq!(q.options.len(), 3);
        assert!(q.question.contains("3 units remaining"));

        sim.step();
        assert_eq!(sim.process_by_name("A").unwrap().state, ProcessState::Ready);
    }

    #[test]
    fn test_empty_and_finished_are_quiet() {
        let empty = Simulator::new();
        assert!(QuizTrigger::new().check(&empty, &mut FixedRoll(true)).is_none());

        let mut done = sim(SimConfig::default(), &[("A", 0, 1, "CPU(1)")]);
        done.run_to_completion(10);
        assert!(QuizTrigger::new().check(&done, &mut FixedRoll(true)).is_none());
    }

    #[test]
    fn test_check_leaves_simulator_untouched() {
        let mut sim = sim(
            SimConfig::for_algorithm(Algorithm::Srtf),
            &[("A", 0, 1, "CPU(8)"), ("B", 2, 1, "CPU(3)")],
        );
        steps(&mut sim, 2);
        let before = sim.snapshot();
        QuizTrigger::new().check(&sim, &mut FixedRoll(true));
        assert_eq!(sim.snapshot(), before);
    }
}
