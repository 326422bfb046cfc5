//! Quiz question records

use sched_types::{Algorithm, Tick};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a quiz question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionId(Uuid);

impl QuestionId {
    /// Creates a new random question ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a question ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for QuestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Question({})", self.0)
    }
}

/// What a question is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizKind {
    /// Will an arrival take the core from its occupant?
    Preemption,
    /// Which ready process runs once the core frees up?
    NextProcess,
    /// What happens to an occupant whose time slice runs out?
    QuantumExpiry,
}

/// A multiple-choice question about the upcoming tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: QuestionId,
    pub kind: QuizKind,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    /// Tick the question is about
    pub tick: Tick,
    pub algorithm: Algorithm,
    /// Name of the occupant involved, if any
    pub current_process: Option<String>,
    /// Name of the arriving process involved, if any
    pub arriving_process: Option<String>,
}

impl QuizQuestion {
    pub fn new(
        kind: QuizKind,
        tick: Tick,
        algorithm: Algorithm,
        question: String,
        options: Vec<String>,
        correct_answer: String,
        explanation: String,
    ) -> Self {
        Self {
            id: QuestionId::new(),
            kind,
            question,
            options,
            correct_answer,
            explanation,
            tick,
            algorithm,
            current_process: None,
            arriving_process: None,
        }
    }

    pub fn with_current(mut self, name: &str) -> Self {
        self.current_process = Some(name.to_string());
        self
    }

    pub fn with_arriving(mut self, name: &str) -> Self {
        self.arriving_process = Some(name.to_string());
        self
    }

    /// Exact match against the correct option
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim() == self.correct_answer
    }
}
