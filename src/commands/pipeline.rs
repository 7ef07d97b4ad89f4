//! @dose
//! purpose: Driver shared by generate and check. Discovers documentation units, matches each
//!     one to its native header, extracts its declarations, and assembles the aggregate
//!     header list.
//!
//! when-editing:
//!     - !A unit without its header is skipped before extraction and never reaches the header list
//!     - !Fatal ExtractError values propagate; a partial plan is never returned
//!     - Extra headers are appended after matched ones, duplicates are dropped with a warning
//!
//! invariants:
//!     - Units are processed in lexicographic file-name order
//!     - Plan.units and the matched part of Plan.headers have the same order
//!     - Nothing in this module writes to disk
//!
//! gotchas:
//!     - Units with zero emitted functions are skipped (EmptyUnit) even if their header exists
//!     - Fragments are looked up as <fragments_dir>/<unit>_macros.pxd
//!
//! flows:
//!     - Discover -> match header -> check requirement -> extract -> skip empty -> read fragment
//!     - After all units: matched headers + extra headers, deduplicated

use crate::config::Config;
use crate::discovery::{discover_units, DocUnit, UnitFilter};
use crate::parser::{extract_unit, Normalizer};
use crate::types::{Diagnostics, ExtractionResult, WarningKind};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved locations and compiled tables for one run
pub struct RunContext {
    pub config: Config,
    pub doc_dir: PathBuf,
    pub include_dir: PathBuf,
    pub output_dir: PathBuf,
    pub fragments_dir: PathBuf,
    pub normalizer: Normalizer,
    pub filter: UnitFilter,
}

impl RunContext {
    pub fn new(config: Config, root: &Path, units: &[String]) -> Result<Self> {
        let normalizer = Normalizer::new(&config.normalize)?;
        let filter = UnitFilter::new(units, &config.exclude)?;
        Ok(Self {
            doc_dir: Config::resolve(root, &config.doc_dir),
            include_dir: Config::resolve(root, &config.include_dir),
            output_dir: Config::resolve(root, &config.output_dir),
            fragments_dir: Config::resolve(root, &config.fragments_dir),
            config,
            normalizer,
            filter,
        })
    }
}

/// A unit that matched its header and produced declarations
#[derive(Debug)]
pub struct MatchedUnit {
    pub unit: DocUnit,
    pub result: ExtractionResult,
    /// Content of the hand-written extension fragment, if present
    pub fragment: Option<String>,
}

/// Everything needed to write the output of a run
#[derive(Debug, Default)]
pub struct Plan {
    pub units: Vec<MatchedUnit>,
    /// Aggregate header list: matched headers then extra headers
    pub headers: Vec<String>,
    /// Units skipped for a missing header, a missing requirement, or no declarations
    pub skipped: usize,
}

/// Run discovery, matching and extraction over every unit
pub fn build_plan(ctx: &RunContext, diagnostics: &mut Diagnostics) -> Result<Plan> {
    let units = discover_units(&ctx.doc_dir, &ctx.filter)?;
    tracing::debug!(count = units.len(), dir = %ctx.doc_dir.display(), "discovered units");

    let mut plan = Plan::default();
    let mut matched_headers = Vec::new();

    for unit in units {
        match process_unit(ctx, unit, diagnostics)? {
            Some(matched) => {
                matched_headers.push(matched.unit.header_name());
                plan.units.push(matched);
            }
            None => plan.skipped += 1,
        }
    }

    plan.headers = assemble_headers(
        matched_headers,
        &ctx.config.extra_headers,
        &ctx.config.wrap_header,
        diagnostics,
    );
    Ok(plan)
}

fn process_unit(
    ctx: &RunContext,
    unit: DocUnit,
    diagnostics: &mut Diagnostics,
) -> Result<Option<MatchedUnit>> {
    let header = unit.header_name();
    if !ctx.include_dir.join(&header).is_file() {
        diagnostics.warn(
            WarningKind::MissingCounterpart,
            &unit.name,
            format!("skipping unit, no {} in {}", header, ctx.include_dir.display()),
        );
        return Ok(None);
    }

    if let Some(required) = ctx.config.requirement_for(&unit.name) {
        if !ctx.include_dir.join(required).is_file() {
            diagnostics.warn(
                WarningKind::MissingRequirement,
                &unit.name,
                format!("skipping unit, required header {} is missing", required),
            );
            return Ok(None);
        }
    }

    let text = fs::read_to_string(&unit.path)
        .with_context(|| format!("Failed to read {}", unit.path.display()))?;
    let result = extract_unit(&unit.name, &text, &ctx.normalizer, diagnostics)?;

    if result.is_empty() {
        diagnostics.warn(
            WarningKind::EmptyUnit,
            &unit.name,
            "skipping unit, no function declarations",
        );
        return Ok(None);
    }

    let fragment_path = ctx.fragments_dir.join(unit.fragment_name());
    let fragment = if fragment_path.is_file() {
        Some(
            fs::read_to_string(&fragment_path)
                .with_context(|| format!("Failed to read {}", fragment_path.display()))?,
        )
    } else {
        None
    };

    tracing::debug!(
        unit = %unit.name,
        declarations = result.declaration_count(),
        fragment = fragment.is_some(),
        "unit extracted"
    );

    Ok(Some(MatchedUnit {
        unit,
        result,
        fragment,
    }))
}

/// Append extra headers to the matched ones, dropping duplicates with a warning
pub fn assemble_headers(
    matched: Vec<String>,
    extra: &[String],
    aggregate: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(matched.len() + extra.len());
    for header in matched.into_iter().chain(extra.iter().cloned()) {
        if headers.contains(&header) {
            diagnostics.warn(
                WarningKind::DuplicateHeader,
                aggregate,
                format!("{} already in header list", header),
            );
            continue;
        }
        headers.push(header);
    }
    headers
}

/// Summarize deferred declarations on stderr. Individual warnings were already
/// logged through tracing when they were raised; deferred ones are debug events
/// and only show up with `verbose`.
pub fn report_diagnostics(diagnostics: &Diagnostics, verbose: bool) {
    let deferred = diagnostics.count(WarningKind::DeferredDeclaration);
    if deferred > 0 && !verbose {
        eprintln!(
            "{} macro/type declarations recognized but not emitted (use --verbose to list)",
            deferred
        );
    }
}

/// Fail a --strict run that raised warnings
pub fn enforce_strict(diagnostics: &Diagnostics, strict: bool) -> Result<()> {
    if strict && diagnostics.has_reportable() {
        anyhow::bail!(
            "{} warnings raised in strict mode",
            diagnostics.reportable().count()
        );
    }
    Ok(())
}
