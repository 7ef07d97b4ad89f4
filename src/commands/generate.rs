//! @dose
//! purpose: This module implements the generate command that turns every matched
//!     documentation unit into a .pxd file and writes the umbrella header and types.pxd
//!     from their templates.
//!
//! when-editing:
//!     - !All content is rendered in memory before the first write; a fatal error must leave the output untouched
//!     - !The header list order is matched units (sorted) then extra headers
//!     - Template files are read relative to the project root unless absolute
//!
//! invariants:
//!     - Identical inputs produce byte-identical output files
//!     - Units skipped by the driver never get a .pxd and never appear in the aggregates
//!
//! do-not:
//!     - Never write a partially rendered unit
//!
//! gotchas:
//!     - --dry-run still reads the templates so template errors surface early
//!
//! flows:
//!     - Plan: discover, match, extract (commands::pipeline)
//!     - Render: format_pxd per unit, render_template for both aggregates
//!     - Write: create output_dir, write every file, report diagnostics

use crate::cli::GenerateArgs;
use crate::commands::pipeline::{
    build_plan, enforce_strict, report_diagnostics, Plan, RunContext,
};
use crate::config::Config;
use crate::formatter::{
    format_pxd, render_template, types_header_list, wrap_header_list, PxdSettings,
};
use crate::types::Diagnostics;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the generated types declaration file
pub const TYPES_FILE_NAME: &str = "types.pxd";

/// A file ready to be written
#[derive(Debug, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub content: String,
}

pub fn run_generate(args: &GenerateArgs, config: Config, root: &Path, verbose: bool) -> Result<()> {
    let mut config = config;
    args.apply(&mut config);
    let ctx = RunContext::new(config, root, &args.input.units)?;

    let mut diagnostics = Diagnostics::new();
    let plan = build_plan(&ctx, &mut diagnostics)?;
    let files = render_outputs(&ctx, &plan, root)?;

    if args.dry_run {
        for file in &files {
            println!("Would write to: {}", file.path.display());
        }
    } else {
        fs::create_dir_all(&ctx.output_dir).with_context(|| {
            format!("Failed to create output directory {}", ctx.output_dir.display())
        })?;
        for file in &files {
            fs::write(&file.path, &file.content)
                .with_context(|| format!("Failed to write {}", file.path.display()))?;
            if verbose {
                println!("Generated: {}", file.path.display());
            }
        }
    }

    report_diagnostics(&diagnostics, verbose);
    println!(
        "Generated: {}, Skipped: {}, Warnings: {}",
        plan.units.len(),
        plan.skipped,
        diagnostics.reportable().count()
    );

    enforce_strict(&diagnostics, args.input.strict)
}

/// Render every output file of a plan without touching the output directory
pub fn render_outputs(ctx: &RunContext, plan: &Plan, root: &Path) -> Result<Vec<RenderedFile>> {
    let config = &ctx.config;
    let settings = PxdSettings {
        library: &config.library,
        wrap_header: &config.wrap_header,
        preamble_imports: &config.preamble_imports,
    };

    let mut files = Vec::with_capacity(plan.units.len() + 2);
    for matched in &plan.units {
        files.push(RenderedFile {
            path: ctx.output_dir.join(matched.unit.output_name()),
            content: format_pxd(
                &matched.unit.name,
                &matched.result,
                &settings,
                matched.fragment.as_deref(),
            ),
        });
    }

    let wrap_template = read_template(root, &config.templates.wrap)?;
    files.push(RenderedFile {
        path: ctx.output_dir.join(&config.wrap_header),
        content: render_template(
            &wrap_template,
            &wrap_header_list(&config.library, &plan.headers),
        ),
    });

    let types_template = read_template(root, &config.templates.types)?;
    files.push(RenderedFile {
        path: ctx.output_dir.join(TYPES_FILE_NAME),
        content: render_template(
            &types_template,
            &types_header_list(&config.library, &plan.headers),
        ),
    });

    Ok(files)
}

fn read_template(root: &Path, path: &Path) -> Result<String> {
    let path = Config::resolve(root, path);
    fs::read_to_string(&path).with_context(|| format!("Failed to read template {}", path.display()))
}
