//! # Scheduling Quiz
//!
//! Training aids that sit next to the simulator, never inside it.
//!
//! ## Philosophy
//!
//! - **The core stays deterministic**: Questions are derived from a read-only
//!   view of the [`sim_scheduler::Simulator`]. Randomness lives behind the
//!   [`TriggerRoll`] trait and is never consulted by the tick engine.
//! - **Answers come from the engine**: The correct answer is read from a
//!   preview of the coming tick, produced by the engine's own tick function
//!   on a copy of the state, so a question can never disagree with the
//!   simulation that follows it.
//!
//! ## Key Types
//!
//! - [`QuizTrigger`]: inspects the simulator before a tick and may ask a question
//! - [`QuizSession`]: tracks answers and points
//! - [`score_predictions`]: grades completion-time and average-wait guesses

pub mod prediction;
pub mod question;
pub mod roll;
pub mod session;
pub mod trigger;

pub use prediction::{score_predictions, CompletionPrediction, PredictionResults, ScoreBreakdown};
pub use question::{QuestionId, QuizKind, QuizQuestion};
pub use roll::{FixedRoll, SeededRoll, TriggerRoll};
pub use session::{AnswerRecord, QuizError, QuizSession};
pub use trigger::QuizTrigger;
