//! # anyval CLI entry point
//!
//! Parses command-line arguments, loads the optional config file and
//! dispatches to the conversion handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use anyval_cli::config::CliConfig;
use anyval_cli::convert::{
    run_bool, run_float, run_int, run_kind, run_text, run_time, FloatArgs, InputArgs, RunOptions,
    TimeArgs,
};

/// Normalize untyped input into text, numbers, booleans and instants.
///
/// Malformed input prints the target type's zero value unless `--strict`
/// is given.
#[derive(Parser, Debug)]
#[command(name = "anyval", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fail with an error instead of printing a zero value.
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the input as text.
    Text(InputArgs),

    /// Coerce the input to a 64-bit integer.
    Int(InputArgs),

    /// Coerce the input to a float and apply the rounding policy.
    Float(FloatArgs),

    /// Coerce the input to a boolean.
    Bool(InputArgs),

    /// Normalize the input to a UTC instant.
    Time(TimeArgs),

    /// Print the dynamic kind of the input.
    Kind(InputArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let opts = RunOptions {
        strict: cli.strict,
        config,
    };

    let result = match cli.command {
        Commands::Text(args) => run_text(&args, &opts),
        Commands::Int(args) => run_int(&args, &opts),
        Commands::Float(args) => run_float(&args, &opts),
        Commands::Bool(args) => run_bool(&args, &opts),
        Commands::Time(args) => run_time(&args, &opts),
        Commands::Kind(args) => run_kind(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
