//! # Scheduling Simulator Host
//!
//! This crate provides the command-line host for the scheduling simulator.
//!
//! ## Philosophy
//!
//! - **Host owns I/O**: The engine never prints
//! - **Output is snapshot rendering**: A report of state, not a live terminal
//! - **Input is explicit commands**: Scripts, not keystrokes
//! - **Deterministic by default**: The same scenario and script always
//!   print the same report
//!
//! ## Responsibilities
//!
//! The host:
//! - Loads a scenario file or a built-in preset
//! - Applies command-line overrides to its configuration
//! - Runs it to completion, or drives it with a command script
//! - Records quiz questions and scores scripted answers and predictions
//! - Renders a text report or a JSON snapshot

pub mod commands;
pub mod render;
pub mod runtime;
pub mod script;

pub use commands::{HostCommand, HostCommandError, HostCommandParser};
pub use runtime::{HostConfig, HostError, HostRuntime, DEFAULT_MAX_TICKS, DEFAULT_PRESET};
pub use script::{CommandScript, ScriptError};
