//! @dose
//! purpose: This module defines the command-line interface for pxdgen using the clap derive
//!     macros. It specifies all commands (generate, check, extract) and their arguments.
//!
//! when-editing:
//!     - !Each command struct must derive Args and be added to the Commands enum
//!     - !Global flags (root, config, verbose, quiet) are defined on Cli and propagate to all subcommands
//!     - Directory flags override pxdgen.toml through InputOptions::apply
//!
//! invariants:
//!     - The Cli struct is the root parser that clap uses to parse command-line arguments
//!     - PathBuf is used for all file/directory path arguments
//!
//! do-not:
//!     - Never add positional arguments that could conflict with subcommands
//!
//! gotchas:
//!     - Positional UNIT arguments are glob patterns over .rst file names, not paths
//!     - --verbose and --quiet conflict; main.rs maps them to a tracing level

use crate::config::Config;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pxdgen")]
#[command(author, version, about = "Cython .pxd generator for reStructuredText C API docs")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project root (defaults to current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Configuration file (defaults to pxdgen.toml in the root)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate .pxd files and the aggregate headers
    Generate(GenerateArgs),

    /// Extract and match every unit, report warnings, write nothing
    Check(CheckArgs),

    /// Print the extraction result of a single documentation file
    Extract(ExtractArgs),
}

/// Input locations shared between generate and check
#[derive(Args, Clone, Default)]
pub struct InputOptions {
    /// Restrict the run to units whose file name matches (can be repeated)
    #[arg(value_name = "UNIT")]
    pub units: Vec<String>,

    /// Directory holding the .rst documentation units
    #[arg(long, value_name = "DIR")]
    pub doc_dir: Option<PathBuf>,

    /// Directory holding the native headers
    #[arg(long, value_name = "DIR")]
    pub include_dir: Option<PathBuf>,

    /// Fail if any warning was raised
    #[arg(long)]
    pub strict: bool,
}

impl InputOptions {
    /// Override configuration values with the flags that were given
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref dir) = self.doc_dir {
            config.doc_dir = dir.clone();
        }
        if let Some(ref dir) = self.include_dir {
            config.include_dir = dir.clone();
        }
    }
}

#[derive(Args, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub input: InputOptions,

    /// Directory the generated files are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Dry run - show what would be generated without writing
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateArgs {
    pub fn apply(&self, config: &mut Config) {
        self.input.apply(config);
        if let Some(ref dir) = self.output_dir {
            config.output_dir = dir.clone();
        }
    }
}

#[derive(Args, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: InputOptions,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ExtractFormat {
    /// Section-keyed result as pretty JSON
    #[default]
    Json,
    /// Rendered .pxd content
    Pxd,
}

#[derive(Args)]
pub struct ExtractArgs {
    /// Documentation file to extract
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExtractFormat::Json)]
    pub format: ExtractFormat,
}
