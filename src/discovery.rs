//! @dose
//! purpose: Finds the documentation units (.rst files) of a doc directory and applies the
//!     include/exclude glob filters from the command line and pxdgen.toml.
//!
//! when-editing:
//!     - !Units are returned sorted by file name; generation order depends on it
//!     - Patterns match the unit file name (e.g. "fmpz*.rst"), not the full path
//!
//! invariants:
//!     - Only regular files with the .rst extension directly inside doc_dir are units
//!     - An empty include list means every unit is included
//!
//! gotchas:
//!     - Subdirectories of doc_dir are not scanned; documentation units are flat

use crate::config::ConfigError;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of documentation units
pub const UNIT_EXTENSION: &str = "rst";

/// A documentation unit found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocUnit {
    /// File stem, e.g. "fmpz" for fmpz.rst
    pub name: String,
    pub path: PathBuf,
}

impl DocUnit {
    /// Native header expected for this unit
    pub fn header_name(&self) -> String {
        format!("{}.h", self.name)
    }

    /// Hand-written extension fragment expected for this unit
    pub fn fragment_name(&self) -> String {
        format!("{}_macros.pxd", self.name)
    }

    /// Generated declaration file name
    pub fn output_name(&self) -> String {
        format!("{}.pxd", self.name)
    }
}

/// Include/exclude filter over unit file names
#[derive(Debug, Default)]
pub struct UnitFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl UnitFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
        })
    }

    pub fn is_match(&self, file_name: &str) -> bool {
        if let Some(ref exclude) = self.exclude {
            if exclude.is_match(file_name) {
                return false;
            }
        }
        match self.include {
            Some(ref include) => include.is_match(file_name),
            None => true,
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, ConfigError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ConfigError::Glob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map(Some)
        .map_err(|source| ConfigError::Glob {
            pattern: patterns.join(", "),
            source,
        })
}

/// Collect the documentation units of `doc_dir`, sorted by file name
pub fn discover_units(doc_dir: &Path, filter: &UnitFilter) -> Result<Vec<DocUnit>> {
    if !doc_dir.is_dir() {
        anyhow::bail!("Documentation directory not found: {}", doc_dir.display());
    }

    let mut units = Vec::new();
    for entry in WalkDir::new(doc_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry
            .with_context(|| format!("Failed to read directory {}", doc_dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(UNIT_EXTENSION)
        {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if !filter.is_match(&file_name) {
            continue;
        }

        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        units.push(DocUnit {
            name,
            path: path.to_path_buf(),
        });
    }

    Ok(units)
}
