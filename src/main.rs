//! graylog-state CLI entrypoint.
//!
//! This is the main entrypoint for the graylog-state command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use graylog_state::cli::{Cli, Commands, OutputFormatter};
use graylog_state::config::{ConfigParser, ConfigValidator, StateConfig, find_config_file};
use graylog_state::error::Result;
use graylog_state::graylog::GraylogClient;
use graylog_state::reconciler::Reconciler;
use graylog_state::remote::RemoteState;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let formatter = OutputFormatter::new(cli.output);
    match runtime.block_on(run(cli, &formatter)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", formatter.error(&e.to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Validate { warnings } => cmd_validate(config_path, warnings, formatter),
        Commands::Plan { detailed } => cmd_plan(config_path, detailed, formatter).await,
        Commands::Apply { yes } => cmd_apply(config_path, yes, formatter).await,
        Commands::Status => cmd_status(config_path, formatter).await,
        Commands::Drift => cmd_drift(config_path, formatter).await,
    }
}

/// Validate configuration.
fn cmd_validate(
    config_path: Option<&Path>,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (_, config) = load_config(config_path)?;
    let result = ConfigValidator::new().validate(&config)?;

    println!("{}", formatter.format_validation(&config, &result, show_warnings));
    Ok(())
}

/// Show the sync plan.
async fn cmd_plan(
    config_path: Option<&Path>,
    detailed: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config = load_validated_config(config_path)?;
    let client = GraylogClient::connect(&config.api).await?;

    let plan = Reconciler::new(&config.inputs, &client).plan().await?;

    println!("{}", formatter.format_plan(&plan, detailed));
    Ok(())
}

/// Apply the sync plan.
async fn cmd_apply(
    config_path: Option<&Path>,
    auto_approve: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config = load_validated_config(config_path)?;
    let client = GraylogClient::connect(&config.api).await?;
    let reconciler = Reconciler::new(&config.inputs, &client);

    let plan = reconciler.plan().await?;

    if plan.is_empty() {
        println!("{}", formatter.format_plan(&plan, false));
        return Ok(());
    }

    // Show plan
    eprintln!("{}", formatter.format_plan(&plan, true));

    // Confirm
    if !auto_approve {
        eprint!("Do you want to apply this plan? [y/N]: ");
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            eprintln!("Apply cancelled.");
            return Ok(());
        }
    }

    let result = reconciler.apply(&plan).await?;

    println!("{}", formatter.format_reconciliation(&result));
    Ok(())
}

/// List inputs on the server.
async fn cmd_status(config_path: Option<&Path>, formatter: &OutputFormatter) -> Result<()> {
    let config = load_validated_config(config_path)?;
    let client = GraylogClient::connect(&config.api).await?;

    let inputs = client.fetch_all().await?;

    println!("{}", formatter.format_inputs(&inputs));
    Ok(())
}

/// Check for drift.
async fn cmd_drift(config_path: Option<&Path>, formatter: &OutputFormatter) -> Result<()> {
    let config = load_validated_config(config_path)?;
    let client = GraylogClient::connect(&config.api).await?;

    let report = Reconciler::new(&config.inputs, &client).check_drift().await?;

    println!("{}", formatter.format_drift(&report));
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&Path>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.to_path_buf()))
}

/// Loads `.env` and the configuration with environment overrides.
fn load_config(config_path: Option<&Path>) -> Result<(PathBuf, StateConfig)> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Loading configuration from: {}", config_file.display());

    let parser = ConfigParser::new().with_base_path(
        config_file
            .parent()
            .unwrap_or_else(|| Path::new(".")),
    );
    parser.load_dotenv()?;

    let config = parser.load_with_env(&config_file)?;
    Ok((config_file, config))
}

/// Loads the configuration and rejects it if validation fails.
fn load_validated_config(config_path: Option<&Path>) -> Result<StateConfig> {
    let (config_file, config) = load_config(config_path)?;

    let result = ConfigValidator::new().validate(&config)?;
    for warning in &result.warnings {
        tracing::warn!("{warning}");
    }

    info!(
        "Loaded {} inputs from {}",
        config.inputs.len(),
        config_file.display()
    );
    Ok(config)
}
