//! # Host Control Commands
//!
//! The command surface a script drives the simulator with.
//!
//! ## Command Set
//!
//! - `step [n]` - Advance one tick, or `n` ticks
//! - `run` - Advance until every process terminates
//! - `reset` - Reload the scenario from scratch
//! - `rewind` - Restart the current workload from tick 0
//! - `status` - Record a one-line status
//! - `quit` - Stop processing commands
//! - `answer <option>` - Answer the open quiz question
//! - `predict <process> <tick>` - Guess a completion time
//! - `predict avg-wait <value>` - Guess the average waiting time

use thiserror::Error;

/// Host command error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostCommandError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid tick count: {0}")]
    InvalidCount(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid prediction: {0}")]
    InvalidPrediction(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Advance a fixed number of ticks
    Step(u64),
    Run,
    Reset,
    Rewind,
    Status,
    Quit,
    /// Answer text, matched against the offered options
    Answer(String),
    Predict { process: String, tick: u64 },
    PredictAverageWait(f64),
}

/// Host command parser
pub struct HostCommandParser;

impl HostCommandParser {
    /// Parses a command string
    pub fn parse(input: &str) -> Result<HostCommand, HostCommandError> {
        let input = input.trim();

        if input.is_empty() {
            return Err(HostCommandError::InvalidCommand(
                "Empty command".to_string(),
            ));
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();
        let args = &parts[1..];

        let command = match cmd.as_str() {
            "step" | "s" => return Self::parse_step(args),
            "answer" => return Self::parse_answer(args),
            "predict" => return Self::parse_predict(args),
            "run" => HostCommand::Run,
            "reset" => HostCommand::Reset,
            "rewind" => HostCommand::Rewind,
            "status" => HostCommand::Status,
            "quit" | "exit" => HostCommand::Quit,
            _ => return Err(HostCommandError::UnknownCommand(cmd)),
        };

        if !args.is_empty() {
            return Err(HostCommandError::InvalidCommand(format!(
                "{} takes no arguments",
                cmd
            )));
        }
        Ok(command)
    }

    fn parse_step(args: &[&str]) -> Result<HostCommand, HostCommandError> {
        match args {
            [] => Ok(HostCommand::Step(1)),
            [count] => match count.parse::<u64>() {
                Ok(n) if n > 0 => Ok(HostCommand::Step(n)),
                _ => Err(HostCommandError::InvalidCount(count.to_string())),
            },
            _ => Err(HostCommandError::InvalidCommand(
                "step takes at most one argument".to_string(),
            )),
        }
    }

    fn parse_answer(args: &[&str]) -> Result<HostCommand, HostCommandError> {
        if args.is_empty() {
            return Err(HostCommandError::InvalidCommand(
                "answer needs an option".to_string(),
            ));
        }
        Ok(HostCommand::Answer(args.join(" ")))
    }

    fn parse_predict(args: &[&str]) -> Result<HostCommand, HostCommandError> {
        match args {
            [target, value] if target.eq_ignore_ascii_case("avg-wait") => match value.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => Ok(HostCommand::PredictAverageWait(v)),
                _ => Err(HostCommandError::InvalidPrediction(value.to_string())),
            },
            [process, tick] => tick
                .parse::<u64>()
                .map(|tick| HostCommand::Predict {
                    process: process.to_string(),
                    tick,
                })
                .map_err(|_| HostCommandError::InvalidPrediction(tick.to_string())),
            _ => Err(HostCommandError::InvalidCommand(
                "usage: predict <process> <tick> | predict avg-wait <value>".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step_default() {
        assert_eq!(HostCommandParser::parse("step").unwrap(), HostCommand::Step(1));
        assert_eq!(HostCommandParser::parse("s").unwrap(), HostCommand::Step(1));
    }

    #[test]
    fn test_parse_step_count() {
        assert_eq!(
            HostCommandParser::parse("  STEP 12 ").unwrap(),
            HostCommand::Step(12)
        );
    }

    #[test]
    fn test_parse_step_bad_count() {
        assert_eq!(
            HostCommandParser::parse("step 0"),
            Err(HostCommandError::InvalidCount("0".to_string()))
        );
        assert_eq!(
            HostCommandParser::parse("step many"),
            Err(HostCommandError::InvalidCount("many".to_string()))
        );
        assert!(HostCommandParser::parse("step 1 2").is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(HostCommandParser::parse("run").unwrap(), HostCommand::Run);
        assert_eq!(HostCommandParser::parse("reset").unwrap(), HostCommand::Reset);
        assert_eq!(HostCommandParser::parse("rewind").unwrap(), HostCommand::Rewind);
        assert_eq!(HostCommandParser::parse("status").unwrap(), HostCommand::Status);
        assert_eq!(HostCommandParser::parse("quit").unwrap(), HostCommand::Quit);
        assert_eq!(HostCommandParser::parse("exit").unwrap(), HostCommand::Quit);
    }

    #[test]
    fn test_parse_extra_arguments() {
        assert!(matches!(
            HostCommandParser::parse("run fast"),
            Err(HostCommandError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            HostCommandParser::parse("   "),
            Err(HostCommandError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_parse_answer_keeps_case_and_spacing() {
        assert_eq!(
            HostCommandParser::parse("ANSWER Yes,   preempt").unwrap(),
            HostCommand::Answer("Yes, preempt".to_string())
        );
        assert!(HostCommandParser::parse("answer").is_err());
    }

    #[test]
    fn test_parse_predictions() {
        assert_eq!(
            HostCommandParser::parse("predict P2 8").unwrap(),
            HostCommand::Predict {
                process: "P2".to_string(),
                tick: 8
            }
        );
        assert_eq!(
            HostCommandParser::parse("predict avg-wait 3.5").unwrap(),
            HostCommand::PredictAverageWait(3.5)
        );
        assert_eq!(
            HostCommandParser::parse("predict P2 soon"),
            Err(HostCommandError::InvalidPrediction("soon".to_string()))
        );
        assert_eq!(
            HostCommandParser::parse("predict avg-wait -1"),
            Err(HostCommandError::InvalidPrediction("-1".to_string()))
        );
        assert!(matches!(
            HostCommandParser::parse("predict P2"),
            Err(HostCommandError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            HostCommandParser::parse("fork"),
            Err(HostCommandError::UnknownCommand("fork".to_string()))
        );
    }
}
