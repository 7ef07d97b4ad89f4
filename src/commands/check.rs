//! @dose
//! purpose: This module implements the check command: the full discovery, matching and
//!     extraction pass of generate, without rendering or writing anything.
//!
//! when-editing:
//!     - !Must stay in sync with generate's planning step (both call pipeline::build_plan)
//!
//! invariants:
//!     - Never writes to disk
//!     - Structural errors fail the command exactly like they fail generate
//!
//! gotchas:
//!     - --strict fails on any warning except deferred macro/type declarations

use crate::cli::CheckArgs;
use crate::commands::pipeline::{build_plan, enforce_strict, report_diagnostics, RunContext};
use crate::config::Config;
use crate::types::Diagnostics;
use anyhow::Result;
use std::path::Path;

pub fn run_check(args: &CheckArgs, config: Config, root: &Path, verbose: bool) -> Result<()> {
    let mut config = config;
    args.input.apply(&mut config);
    let ctx = RunContext::new(config, root, &args.input.units)?;

    let mut diagnostics = Diagnostics::new();
    let plan = build_plan(&ctx, &mut diagnostics)?;

    if verbose {
        for matched in &plan.units {
            println!(
                "{}: {} declarations in {} sections",
                matched.unit.name,
                matched.result.declaration_count(),
                matched.result.sections().len()
            );
        }
    }

    report_diagnostics(&diagnostics, verbose);
    println!(
        "Matched: {}, Skipped: {}, Headers: {}, Warnings: {}",
        plan.units.len(),
        plan.skipped,
        plan.headers.len(),
        diagnostics.reportable().count()
    );

    enforce_strict(&diagnostics, args.input.strict)
}
