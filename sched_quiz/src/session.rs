//! Answer tracking

use crate::question::{QuestionId, QuizKind, QuizQuestion};
use sched_types::Tick;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Points awarded for a correct answer
pub const POINTS_PER_CORRECT: u32 = 10;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("No question is waiting for an answer")]
    NoActiveQuestion,

    #[error("'{0}' is not one of the offered options")]
    UnknownOption(String),
}

/// One answered question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub kind: QuizKind,
    pub tick: Tick,
    pub answer: String,
    pub correct_answer: String,
    pub correct: bool,
    pub points: u32,
    pub time_taken_ms: u64,
}

/// Running score for one learner
///
/// At most one question is open at a time; asking a new one replaces it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizSession {
    active: Option<QuizQuestion>,
    questions_answered: u32,
    correct_answers: u32,
    total_points: u32,
    history: Vec<AnswerRecord>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a question, returning the one it displaced
    pub fn ask(&mut self, question: QuizQuestion) -> Option<QuizQuestion> {
        self.active.replace(question)
    }

    pub fn active(&self) -> Option<&QuizQuestion> {
        self.active.as_ref()
    }

    /// Closes the open question without scoring it
    pub fn dismiss(&mut self) -> Option<QuizQuestion> {
        self.active.take()
    }

    /// Scores an answer to the open question
    ///
    /// An answer outside the offered options is rejected and the question
    /// stays open.
    pub fn answer(&mut self, answer: &str, time_taken_ms: u64) -> Result<AnswerRecord, QuizError> {
        let question = self.active.as_ref().ok_or(QuizError::NoActiveQuestion)?;
        let answer = answer.trim();
        if !question.options.iter().any(|o| o == answer) {
            return Err(QuizError::UnknownOption(answer.to_string()));
        }

        let correct = question.is_correct(answer);
        let points = if correct { POINTS_PER_CORRECT } else { 0 };
        let record = AnswerRecord {
            question_id: question.id,
            kind: question.kind,
            tick: question.tick,
            answer: answer.to_string(),
            correct_answer: question.correct_answer.clone(),
            correct,
            points,
            time_taken_ms,
        };

        self.active = None;
        self.questions_answered += 1;
        if correct {
            self.correct_answers += 1;
        }
        self.total_points += points;
        self.history.push(record.clone());
        Ok(record)
    }

    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    pub fn history(&self) -> &[AnswerRecord] {
        &self.history
    }

    /// Percentage of correct answers, 0 before the first answer
    pub fn accuracy(&self) -> f64 {
        if self.questions_answered == 0 {
            return 0.0;
        }
        f64::from(self.correct_answers) / f64::from(self.questions_answered) * 100.0
    }

    /// Forgets every answer
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
