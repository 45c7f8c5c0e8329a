//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// graylog-state - Declarative Graylog input manager.
#[derive(Parser, Debug)]
#[command(name = "graylog-state")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "GRAYLOG_STATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the configuration document.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Compute and display the sync plan.
    Plan {
        /// Show every differing field.
        #[arg(short, long)]
        detailed: bool,
    },

    /// Apply the sync plan to the server.
    Apply {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// List the inputs currently on the server.
    Status,

    /// Check for drift between config and server state.
    Drift,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apply_with_globals() {
        let cli = Cli::try_parse_from([
            "graylog-state",
            "--config",
            "/etc/graylog-state.yaml",
            "--output",
            "json",
            "apply",
            "--yes",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/graylog-state.yaml")));
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Apply { yes: true }));
    }

    #[test]
    fn test_parse_plan_verbose() {
        let cli = Cli::try_parse_from(["graylog-state", "plan", "-d", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Plan { detailed: true }));
    }

    #[test]
    fn test_unknown_command_fails() {
        assert!(Cli::try_parse_from(["graylog-state", "destroy"]).is_err());
    }
}
