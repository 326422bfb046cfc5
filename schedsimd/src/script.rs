//! # Command Scripts
//!
//! Line-based scripts for deterministic batch runs and demos.
//!
//! ## Format
//!
//! One host command per line. Blank lines are skipped and `#` starts a
//! comment, either on its own line or after a command.
//!
//! ```text
//! # Watch the first preemption, then finish
//! step 4
//! status      # where are we?
//! run
//! ```

use crate::commands::{HostCommand, HostCommandParser};
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Empty script")]
    EmptyScript,
}

/// Parsed command script, consumed front to back
#[derive(Debug, Clone, Default)]
pub struct CommandScript {
    commands: VecDeque<HostCommand>,
}

impl CommandScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, ScriptError> {
        let mut commands = VecDeque::new();

        for (line_num, line) in text.lines().enumerate() {
            let line = match line.find('#') {
                Some(at) => &line[..at],
                None => line,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            let command = HostCommandParser::parse(line).map_err(|e| ScriptError::ParseError {
                line: line_num + 1,
                message: e.to_string(),
            })?;
            commands.push_back(command);
        }

        if commands.is_empty() {
            return Err(ScriptError::EmptyScript);
        }

        Ok(Self { commands })
    }

    pub fn push(&mut self, command: HostCommand) {
        self.commands.push_back(command);
    }

    pub fn next_command(&mut self) -> Option<HostCommand> {
        self.commands.pop_front()
    }

    pub fn has_more(&self) -> bool {
        !self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = CommandScript::from_text(
            "# warm up\nstep 3\n\nstatus   # after three ticks\nrun\nquit\n",
        )
        .unwrap();
        assert_eq!(script.len(), 4);

        let mut script = script;
        assert_eq!(script.next_command(), Some(HostCommand::Step(3)));
        assert_eq!(script.next_command(), Some(HostCommand::Status));
        assert_eq!(script.next_command(), Some(HostCommand::Run));
        assert_eq!(script.next_command(), Some(HostCommand::Quit));
        assert!(!script.has_more());
        assert_eq!(script.next_command(), None);
    }

    #[test]
    fn test_error_reports_line() {
        let err = CommandScript::from_text("step\nstep\nlaunch rocket\n").unwrap_err();
        assert!(matches!(err, ScriptError::ParseError { line: 3, .. }));
    }

    #[test]
    fn test_comment_only_script_is_empty() {
        assert_eq!(
            CommandScript::from_text("# nothing\n\n   # here\n").unwrap_err(),
            ScriptError::EmptyScript
        );
    }

    #[test]
    fn test_push() {
        let mut script = CommandScript::new();
        assert!(script.is_empty());
        script.push(HostCommand::Run);
        assert!(script.has_more());
    }
}
