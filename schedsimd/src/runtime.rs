//! # Host Runtime
//!
//! Loads a workload, drives the simulator and keeps what the report needs.

use crate::commands::HostCommand;
use crate::render;
use crate::script::{CommandScript, ScriptError};
use sched_log::LogLevel;
use sched_quiz::{
    score_predictions, CompletionPrediction, PredictionResults, QuizQuestion, QuizSession,
    QuizTrigger, SeededRoll,
};
use sched_types::Algorithm;
use scenarios::{find_preset, preset_names, Scenario, ScenarioError, ScenarioLoader};
use sim_scheduler::{SimConfig, SimError, Simulator};
use std::path::PathBuf;
use thiserror::Error;

/// Tick budget when none is given
pub const DEFAULT_MAX_TICKS: u64 = 10_000;

/// Workload used when neither a file nor a preset is named
pub const DEFAULT_PRESET: &str = "Basic FCFS";

/// Host runtime error types
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Unknown preset: {name} (available: {available})")]
    UnknownPreset { name: String, available: String },

    #[error("--scenario and --preset are mutually exclusive")]
    ConflictingWorkload,

    #[error("Failed to encode snapshot: {0}")]
    Json(String),
}

/// Host runtime configuration
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Scenario file to load
    pub scenario: Option<PathBuf>,
    /// Built-in scenario to load
    pub preset: Option<String>,
    pub algorithm: Option<Algorithm>,
    pub cores: Option<usize>,
    pub quantum: Option<u32>,
    /// Enables aging with this threshold
    pub aging: Option<u64>,
    /// Tick budget for the whole session (0 = unlimited)
    pub max_ticks: u64,
    /// Command script text
    pub script: Option<String>,
    /// Lowest level shown in the event log section
    pub log_level: LogLevel,
    /// Print the snapshot as JSON instead of the text report
    pub json: bool,
    /// Seed for quiz questions; `None` disables them
    pub quiz_seed: Option<u64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            scenario: None,
            preset: None,
            algorithm: None,
            cores: None,
            quantum: None,
            aging: None,
            max_ticks: DEFAULT_MAX_TICKS,
            script: None,
            log_level: LogLevel::Info,
            json: false,
            quiz_seed: None,
        }
    }
}

impl HostConfig {
    /// Applies command-line overrides on top of a scenario's configuration
    pub fn apply_overrides(&self, base: SimConfig) -> SimConfig {
        let mut config = base;
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(cores) = self.cores {
            config = config.with_cores(cores);
        }
        if let Some(quantum) = self.quantum {
            config = config.with_quantum(quantum);
        }
        if let Some(threshold) = self.aging {
            config = config.with_aging(threshold);
        }
        config
    }
}

/// Host runtime
pub struct HostRuntime {
    config: HostConfig,
    /// Scenario with overrides folded in, used by `reset`
    scenario: Scenario,
    sim: Simulator,
    script: Option<CommandScript>,
    /// Ticks executed this session, across resets
    ticks: u64,
    transcript: Vec<String>,
    quiz: Option<(QuizTrigger, SeededRoll)>,
    questions: Vec<QuizQuestion>,
    /// Scores scripted answers to the questions above
    session: QuizSession,
    predictions: Vec<CompletionPrediction>,
    predicted_awt: Option<f64>,
    quit: bool,
}

impl HostRuntime {
    /// Loads the workload and builds the simulator
    pub fn new(config: HostConfig) -> Result<Self, HostError> {
        let mut scenario = Self::load_scenario(&config)?;
        let sim_config = config.apply_overrides(scenario.config.clone().unwrap_or_default());
        sim_config.validate()?;
        scenario.config = Some(sim_config);
        let sim = scenario.instantiate()?;

        let script = config
            .script
            .as_deref()
            .map(CommandScript::from_text)
            .transpose()?;
        let quiz = config
            .quiz_seed
            .map(|seed| (QuizTrigger::new(), SeededRoll::new(seed)));

        Ok(Self {
            config,
            scenario,
            sim,
            script,
            ticks: 0,
            transcript: Vec::new(),
            quiz,
            questions: Vec::new(),
            session: QuizSession::new(),
            predictions: Vec::new(),
            predicted_awt: None,
            quit: false,
        })
    }

    fn load_scenario(config: &HostConfig) -> Result<Scenario, HostError> {
        match (&config.scenario, &config.preset) {
            (Some(_), Some(_)) => Err(HostError::ConflictingWorkload),
            (Some(path), None) => Ok(ScenarioLoader::load_from_path(path)?),
            (None, preset) => {
                let name = preset.as_deref().unwrap_or(DEFAULT_PRESET);
                find_preset(name).ok_or_else(|| HostError::UnknownPreset {
                    name: name.to_string(),
                    available: preset_names().join(", "),
                })
            }
        }
    }

    /// Runs the script, or the whole workload when there is none
    ///
    /// Returns when:
    /// - The script is exhausted or says `quit`
    /// - Every process has terminated (no script)
    /// - The tick budget is spent
    pub fn run(&mut self) -> Result<(), HostError> {
        match self.script.take() {
            Some(mut script) => {
                while let Some(command) = script.next_command() {
                    self.execute(command)?;
                    if self.quit {
                        break;
                    }
                }
            }
            None => self.run_until_done()?,
        }
        Ok(())
    }

    /// Executes one host command
    pub fn execute(&mut self, command: HostCommand) -> Result<(), HostError> {
        match command {
            HostCommand::Step(count) => {
                for _ in 0..count {
                    if !self.step() {
                        break;
                    }
                }
            }
            HostCommand::Run => self.run_until_done()?,
            HostCommand::Reset => {
                self.scenario.apply(&mut self.sim)?;
                self.transcript
                    .push(format!("reset: reloaded {}", self.scenario.name));
            }
            HostCommand::Rewind => {
                self.sim.rewind();
                self.transcript.push("rewind: back to tick 0".to_string());
            }
            HostCommand::Status => {
                let line = render::status_line(&self.sim);
                self.transcript.push(line);
            }
            HostCommand::Quit => self.quit = true,
            HostCommand::Answer(text) => self.answer(&text),
            HostCommand::Predict { process, tick } => self.predict(&process, tick),
            HostCommand::PredictAverageWait(value) => {
                self.predicted_awt = Some(value);
                self.transcript
                    .push(format!("predict: average wait {:.2}", value));
            }
        }
        Ok(())
    }

    fn answer(&mut self, text: &str) {
        let line = match self.session.answer(text, 0) {
            Ok(record) if record.correct => {
                format!("answer: {} (correct, +{})", record.answer, record.points)
            }
            Ok(record) => format!(
                "answer: {} (wrong, expected {})",
                record.answer, record.correct_answer
            ),
            Err(e) => format!("answer ignored: {}", e),
        };
        self.transcript.push(line);
    }

    fn predict(&mut self, name: &str, tick: u64) {
        let Some(id) = self.sim.process_by_name(name).map(|p| p.id) else {
            self.transcript
                .push(format!("predict ignored: unknown process {}", name));
            return;
        };
        self.predictions.retain(|p| p.process != id);
        self.predictions
            .push(CompletionPrediction::new(id, Some(tick)));
        self.transcript
            .push(format!("predict: {} completes at {}", name, tick));
    }

    /// Executes a single tick if the workload and the budget allow it
    pub fn step(&mut self) -> bool {
        if self.sim.is_finished() || self.budget_spent() {
            return false;
        }
        self.ask_quiz();
        self.sim.step();
        self.ticks += 1;
        true
    }

    fn run_until_done(&mut self) -> Result<(), HostError> {
        if self.sim.is_finished() {
            return Ok(());
        }
        self.sim.start()?;
        while !self.budget_spent() {
            self.ask_quiz();
            if !self.sim.tick() {
                break;
            }
            self.ticks += 1;
        }
        self.sim.pause();
        Ok(())
    }

    fn ask_quiz(&mut self) {
        if let Some((trigger, roll)) = &mut self.quiz {
            if let Some(question) = trigger.check(&self.sim, roll) {
                self.questions.push(question.clone());
                self.session.ask(question);
            }
        }
    }

    fn budget_spent(&self) -> bool {
        self.config.max_ticks > 0 && self.ticks >= self.config.max_ticks
    }

    /// True when the budget ran out before the workload finished
    pub fn limit_reached(&self) -> bool {
        self.budget_spent() && !self.sim.is_finished()
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    pub fn ticks_run(&self) -> u64 {
        self.ticks
    }

    /// Lines recorded by `status`, `reset`, `rewind`, `answer` and `predict`
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn quiz_session(&self) -> &QuizSession {
        &self.session
    }

    /// Grades the recorded predictions, `None` when nothing was predicted
    pub fn prediction_results(&self) -> Option<PredictionResults> {
        if self.predictions.is_empty() && self.predicted_awt.is_none() {
            return None;
        }
        Some(score_predictions(
            self.sim.processes(),
            &self.predictions,
            self.predicted_awt,
        ))
    }

    /// Final output: the text report, or the snapshot as JSON
    pub fn report(&self) -> Result<String, HostError> {
        if self.config.json {
            serde_json::to_string_pretty(&self.sim.snapshot())
                .map_err(|e| HostError::Json(e.to_string()))
        } else {
            Ok(render::report(self))
        }
    }
}
