//! CLI module for the graylog-state tool.
//!
//! This module provides the command-line interface for managing
//! Graylog inputs.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
