//! @dose
//! purpose: This is the CLI entry point for pxdgen. It parses command-line arguments using clap,
//!     sets up tracing, determines the project root, loads pxdgen.toml and dispatches to the
//!     appropriate command handler (generate, check or extract).
//!
//! when-editing:
//!     - !The root directory defaults to current working directory if not specified
//!     - !An explicit --config file must parse; the implicit pxdgen.toml falls back to defaults
//!     - Error messages are printed to stderr and exit with code 1
//!
//! invariants:
//!     - One and only one subcommand is always executed per invocation
//!     - The process exits with 0 on success, 1 on any error
//!     - Log output goes to stderr so extract can pipe its result
//!     - Recoverable warnings are tracing events, so --quiet and PXDGEN_LOG filter them
//!
//! do-not:
//!     - Never add business logic here - delegate to command modules
//!
//! gotchas:
//!     - PXDGEN_LOG overrides the level chosen from --verbose/--quiet

use anyhow::Context;
use clap::Parser;
use pxdgen::cli::{Cli, Commands};
use pxdgen::commands::{run_check, run_extract, run_generate};
use pxdgen::config::Config;
use std::env;
use std::io::IsTerminal;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let root = match cli.root {
        Some(root) => root,
        None => env::current_dir().context("Failed to get current directory")?,
    };

    let config = match cli.config {
        Some(ref path) => Config::from_file(&Config::resolve(&root, path))?,
        None => Config::load(&root),
    };

    match cli.command {
        Commands::Generate(args) => run_generate(&args, config, &root, cli.verbose),
        Commands::Check(args) => run_check(&args, config, &root, cli.verbose),
        Commands::Extract(args) => run_extract(&args, config, &root, cli.verbose),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("PXDGEN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
