//! Prediction scoring
//!
//! Before running a workload the learner guesses each completion time and
//! the average waiting time; once the run ends the guesses are graded
//! against the simulated results.

use sched_types::{Process, ProcessId, Tick};
use serde::{Deserialize, Serialize};

pub const COMPLETION_MAX_POINTS: u32 = 10;
pub const AVERAGE_WAIT_MAX_POINTS: u32 = 20;

/// A guessed completion time for one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionPrediction {
    pub process: ProcessId,
    /// `None` when the learner left the field blank
    pub predicted: Option<Tick>,
}

impl CompletionPrediction {
    pub fn new(process: ProcessId, predicted: Option<Tick>) -> Self {
        Self { process, predicted }
    }
}

/// Grade for one completion-time guess
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub process: ProcessId,
    pub process_name: String,
    pub predicted: Option<Tick>,
    pub actual: Option<Tick>,
    pub difference: Option<u64>,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResults {
    pub breakdown: Vec<ScoreBreakdown>,
    pub predicted_awt: Option<f64>,
    /// Average wait over completed processes
    pub actual_awt: f64,
    pub awt_difference: Option<f64>,
    pub awt_points: u32,
    pub total_score: u32,
    pub max_score: u32,
    /// `total_score / max_score` as a percentage
    pub accuracy: f64,
}

fn completion_points(difference: u64) -> u32 {
    match difference {
        0 => COMPLETION_MAX_POINTS,
        1 => 5,
        2..=3 => 2,
        _ => 0,
    }
}

fn awt_points(difference: f64) -> u32 {
    if difference <= 0.5 {
        AVERAGE_WAIT_MAX_POINTS
    } else if difference <= 1.0 {
        10
    } else if difference <= 2.0 {
        5
    } else {
        0
    }
}

/// Grades predictions against the processes of a finished run
///
/// Every prediction counts toward the maximum, including blank ones and
/// ones for processes that never completed.
pub fn score_predictions(
    processes: &[Process],
    predictions: &[CompletionPrediction],
    predicted_awt: Option<f64>,
) -> PredictionResults {
    let breakdown: Vec<ScoreBreakdown> = predictions
        .iter()
        .map(|prediction| {
            let process = processes.iter().find(|p| p.id == prediction.process);
            let actual = process.and_then(|p| p.completion_time);
            let difference = prediction
                .predicted
                .zip(actual)
                .map(|(guess, actual)| guess.abs_diff(actual));

            ScoreBreakdown {
                process: prediction.process,
                process_name: process
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| prediction.process.to_string()),
                predicted: prediction.predicted,
                actual,
                difference,
                points: difference.map_or(0, completion_points),
            }
        })
        .collect();

    let completed: Vec<&Process> = processes
        .iter()
        .filter(|p| p.completion_time.is_some())
        .collect();
    let actual_awt = if completed.is_empty() {
        0.0
    } else {
        completed.iter().map(|p| p.wait_time as f64).sum::<f64>() / completed.len() as f64
    };

    let awt_difference = predicted_awt.map(|guess| (guess - actual_awt).abs());
    let awt_points = awt_difference.map_or(0, awt_points);

    let total_score = breakdown.iter().map(|b| b.points).sum::<u32>() + awt_points;
    let max_score = COMPLETION_MAX_POINTS * breakdown.len() as u32 + AVERAGE_WAIT_MAX_POINTS;
    let accuracy = f64::from(total_score) / f64::from(max_score) * 100.0;

    PredictionResults {
        breakdown,
        predicted_awt,
        actual_awt,
        awt_difference,
        awt_points,
        total_score,
        max_score,
        accuracy,
    }
}
