//! `wallcycle` binary: phase- and weather-driven wallpaper selection.
//!
//! This is the entry point that wires configuration, the phase clock, the
//! resolver, and the state cache together behind four subcommands:
//!
//! - `resolve`: resolve one wallpaper for a phase and an optional reading.
//! - `run`: one full cycle (resolve, compare with the cache, apply, persist).
//! - `phase`: the current phase and next checkpoint from a weather payload.
//! - `validate`: load the configuration and report the matrix shape.
//!
//! # Startup Sequence
//!
//! 1. Parse command-line arguments
//! 2. Initialize structured logging (tracing) on stderr
//! 3. Run the subcommand
//! 4. Print its JSON result on stdout

mod commands;
mod error;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::commands::{PhaseArgs, ResolveArgs, RunArgs};

#[derive(Debug, Parser)]
#[command(name = "wallcycle", version)]
#[command(about = "Pick wallpapers by solar phase and weather")]
struct Args {
    /// Directory holding `config.json` (or the legacy `wallpapers.json`)
    #[arg(long, default_value = "config", global = true)]
    config_dir: PathBuf,

    /// Log filter, e.g. `debug` or `weather=info`; overrides `RUST_LOG`
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve a wallpaper and print it; the cache is not touched
    Resolve(ResolveArgs),
    /// Run one cycle; without `--apply-cmd` nothing is applied or written
    Run(RunArgs),
    /// Print the current phase and the next phase boundary
    Phase(PhaseArgs),
    /// Validate the configuration and report the matrix shape
    Validate,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the
/// subcommand fails; the process then exits non-zero.
fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only the JSON result.
    let filter = args.log_level.as_deref().map_or_else(
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        EnvFilter::new,
    );
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let output = match &args.command {
        Command::Resolve(resolve) => commands::resolve(&args.config_dir, resolve),
        Command::Run(run) => commands::run(&args.config_dir, run),
        Command::Phase(phase) => commands::phase(phase),
        Command::Validate => commands::validate(&args.config_dir),
    }
    .inspect_err(|e| error!(error = %e, "command failed"))?;

    let rendered = serde_json::to_string_pretty(&output).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
