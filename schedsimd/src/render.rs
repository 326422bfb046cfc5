//! # Text Report
//!
//! Renders simulator state as plain text. No ANSI codes, no cursor control:
//! the output is a snapshot that can be diffed or pasted into a bug report.

use crate::runtime::HostRuntime;
use sched_log::LogLevel;
use sched_quiz::PredictionResults;
use sched_types::{format_burst_pattern, ProcessState};
use sim_scheduler::Simulator;
use std::fmt::Write;

const IDLE_CELL: &str = "-";

/// One-line summary used by the `status` command
pub fn status_line(sim: &Simulator) -> String {
    let cores: Vec<String> = sim
        .cores()
        .iter()
        .map(|core| {
            let occupant = core
                .current
                .and_then(|id| sim.process(id))
                .map_or(IDLE_CELL, |p| p.name.as_str());
            format!("{}: {} (ready {})", core.id, occupant, core.ready_queue.len())
        })
        .collect();
    let done = sim
        .processes()
        .iter()
        .filter(|p| p.state == ProcessState::Terminated)
        .count();

    format!(
        "t={} {:?} | {} | io {} | done {}/{}",
        sim.clock(),
        sim.run_state(),
        cores.join(" | "),
        sim.io_device().len(),
        done,
        sim.processes().len()
    )
}

/// One row per core, one cell per tick
pub fn gantt_rows(sim: &Simulator) -> Vec<String> {
    let width = sim
        .processes()
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(1)
        .max(IDLE_CELL.len());

    sim.cores()
        .iter()
        .map(|core| {
            let cells: Vec<String> = core
                .gantt
                .iter()
                .flat_map(|segment| {
                    let name = segment
                        .process
                        .and_then(|id| sim.process(id))
                        .map_or(IDLE_CELL, |p| p.name.as_str());
                    (segment.start..segment.end).map(move |_| format!("{:<width$}", name))
                })
                .collect();
            format!("{:<7}| {}", core.id.to_string(), cells.join(" "))
        })
        .collect()
}

/// Per-process results table
pub fn process_table(sim: &Simulator) -> Vec<String> {
    let mut rows = vec![format!(
        "{:<10} {:>4} {:>4}  {:<28} {:<10} {:>4} {:>4} {:>4} {:>4}",
        "Name", "Arr", "Pri", "Bursts", "State", "CT", "TAT", "WT", "RT"
    )];

    let dash = || "-".to_string();
    for p in sim.processes() {
        let completion = p.completion_time.map_or_else(dash, |t| t.to_string());
        let turnaround = if p.completion_time.is_some() {
            p.turnaround_time.to_string()
        } else {
            dash()
        };
        let response = p.response_time.map_or_else(dash, |t| t.to_string());
        rows.push(format!(
            "{:<10} {:>4} {:>4}  {:<28} {:<10} {:>4} {:>4} {:>4} {:>4}",
            p.name,
            p.arrival_time,
            p.priority,
            format_burst_pattern(&p.bursts),
            p.state.to_string(),
            completion,
            turnaround,
            p.wait_time,
            response
        ));
    }
    rows
}

pub fn metrics_block(sim: &Simulator) -> Vec<String> {
    let m = sim.metrics();
    vec![
        format!("Average waiting time:    {:.2}", m.avg_waiting_time),
        format!("Average turnaround time: {:.2}", m.avg_turnaround_time),
        format!("Average response time:   {:.2}", m.avg_response_time),
        format!("CPU utilization:         {:.1}%", m.cpu_utilization),
        format!("Throughput:              {:.3} processes/tick", m.throughput),
        format!(
            "Completed:               {}/{}",
            m.completed_processes, m.total_processes
        ),
    ]
}

/// Event log entries at or above `min_level`
pub fn log_lines(sim: &Simulator, min_level: LogLevel) -> Vec<String> {
    sim.events()
        .entries(min_level)
        .into_iter()
        .map(|entry| {
            format!(
                "[{:>4}] {:<5} {}",
                entry.tick,
                entry.level.as_str(),
                entry.message
            )
        })
        .collect()
}

/// Graded guesses, one line per process plus the average wait and total
pub fn prediction_lines(results: &PredictionResults) -> Vec<String> {
    let dash = || "-".to_string();
    let mut lines: Vec<String> = results
        .breakdown
        .iter()
        .map(|b| {
            format!(
                "{:<10} predicted {:>4}  actual {:>4}  {:>2} pts",
                b.process_name,
                b.predicted.map_or_else(dash, |t| t.to_string()),
                b.actual.map_or_else(dash, |t| t.to_string()),
                b.points
            )
        })
        .collect();
    if let Some(guess) = results.predicted_awt {
        lines.push(format!(
            "Average wait predicted {:.2}  actual {:.2}  {:>2} pts",
            guess, results.actual_awt, results.awt_points
        ));
    }
    lines.push(format!(
        "Total: {}/{} ({:.0}%)",
        results.total_score, results.max_score, results.accuracy
    ));
    lines
}

fn section(out: &mut String, title: &str, lines: &[String]) {
    let _ = writeln!(out);
    let _ = writeln!(out, "== {} ==", title);
    for line in lines {
        let _ = writeln!(out, "{}", line);
    }
}

/// Full text report for a finished (or interrupted) session
pub fn report(runtime: &HostRuntime) -> String {
    let sim = runtime.simulator();
    let config = sim.config();
    let mut out = String::new();

    let _ = writeln!(out, "Scenario: {}", runtime.scenario().name);
    let aging = if config.aging_enabled {
        format!("threshold {}", config.aging_threshold)
    } else {
        "off".to_string()
    };
    let _ = writeln!(
        out,
        "Algorithm: {} | Cores: {} | Quantum: {} | Aging: {}",
        config.algorithm.label(),
        config.core_count,
        config.time_quantum,
        aging
    );
    let _ = writeln!(out, "Clock: {} ({:?})", sim.clock(), sim.run_state());
    if runtime.limit_reached() {
        let _ = writeln!(
            out,
            "Stopped after {} ticks: tick limit reached",
            runtime.ticks_run()
        );
    }

    section(&mut out, "Gantt", &gantt_rows(sim));
    section(&mut out, "Processes", &process_table(sim));
    section(&mut out, "Metrics", &metrics_block(sim));

    if !runtime.transcript().is_empty() {
        section(&mut out, "Transcript", runtime.transcript());
    }

    if !runtime.questions().is_empty() {
        let mut lines: Vec<String> = runtime
            .questions()
            .iter()
            .flat_map(|q| {
                [
                    format!("[t={}] {}", q.tick, q.question),
                    format!("    options: {}", q.options.join(" / ")),
                    format!("    answer:  {}", q.correct_answer),
                ]
            })
            .collect();
        let session = runtime.quiz_session();
        if session.questions_answered() > 0 {
            lines.push(format!(
                "Score: {} points, {}/{} correct ({:.0}%)",
                session.total_points(),
                session.correct_answers(),
                session.questions_answered(),
                session.accuracy()
            ));
        }
        section(&mut out, "Quiz", &lines);
    }

    if let Some(results) = runtime.prediction_results() {
        section(&mut out, "Predictions", &prediction_lines(&results));
    }

    let level = runtime.config().log_level;
    section(
        &mut out,
        &format!("Event log ({}+)", level.as_str()),
        &log_lines(sim, level),
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "Log fingerprint: {}", sim.events().fingerprint());
    out
}
