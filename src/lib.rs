//! @dose
//! purpose: This is the library crate root for pxdgen, exposing the extractor, the .pxd
//!     formatter and the generation driver for use as both a CLI tool and a library.
//!
//! when-editing:
//!     - !All public modules must be declared here with pub mod
//!     - Keep the re-export list organized by module
//!
//! invariants:
//!     - parser and formatter perform no I/O; only commands and discovery touch the filesystem
//!
//! do-not:
//!     - Never expose the line-level state machine helpers as the primary API, extract_unit is the entry point
//!
//! gotchas:
//!     - The lib.rs is separate from main.rs - library consumers get lib, CLI gets main

pub mod cli;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod formatter;
pub mod parser;
pub mod types;

// Re-export main types for convenience
pub use cli::{CheckArgs, Cli, Commands, ExtractArgs, GenerateArgs};
pub use config::{Config, ConfigError};
pub use formatter::{format_pxd, render_template, PxdSettings};
pub use parser::{extract_unit, ExtractError, Normalizer};
pub use types::{
    DeclKind, Declaration, Diagnostics, ExtractionResult, Section, Warning, WarningKind,
};
