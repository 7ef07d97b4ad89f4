//! @dose
//! purpose: Aggregation of recoverable warnings raised while discovering, matching and
//!     extracting documentation units, so a run can report all of them at the end.
//!
//! when-editing:
//!     - !Every push also emits a tracing event: warn level, or debug for deferred declarations
//!     - The tracing event is the user-facing report; commands only print the deferred count
//!     - Fatal conditions never go through here, they are ExtractError values
//!
//! invariants:
//!     - Warnings are kept in the order they were raised
//!     - DeferredDeclaration entries are bookkeeping and never fail a --strict run
//!
//! gotchas:
//!     - NameCollision messages carry the signature before and after substitution

use serde::Serialize;
use std::fmt;

/// Category of a recoverable condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// Marker keyword not followed by a space
    MissingSpace,
    /// No native header found for a documentation unit
    MissingCounterpart,
    /// A header the unit additionally requires is missing
    MissingRequirement,
    /// Variadic signature dropped from the result
    UnsupportedConstruct,
    /// Macro or type declaration recognized but not emitted
    DeferredDeclaration,
    /// Reserved parameter name substituted
    NameCollision,
    /// Header listed twice in the aggregate list
    DuplicateHeader,
    /// Unit produced no declarations
    EmptyUnit,
}

impl WarningKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WarningKind::MissingSpace => "missing-space",
            WarningKind::MissingCounterpart => "missing-counterpart",
            WarningKind::MissingRequirement => "missing-requirement",
            WarningKind::UnsupportedConstruct => "unsupported-construct",
            WarningKind::DeferredDeclaration => "deferred-declaration",
            WarningKind::NameCollision => "name-collision",
            WarningKind::DuplicateHeader => "duplicate-header",
            WarningKind::EmptyUnit => "empty-unit",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Documentation unit the warning belongs to, or the aggregate file name
    pub unit: String,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WARN [{}] {}: {}", self.unit, self.kind, self.message)
    }
}

/// Warnings collected over a whole run
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, kind: WarningKind, unit: &str, message: impl Into<String>) {
        let message = message.into();
        if kind == WarningKind::DeferredDeclaration {
            tracing::debug!(unit = %unit, kind = %kind, "{message}");
        } else {
            tracing::warn!(unit = %unit, kind = %kind, "{message}");
        }
        self.warnings.push(Warning {
            kind,
            unit: unit.to_string(),
            message,
        });
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }

    /// Warnings that matter for --strict and for the default report
    pub fn reportable(&self) -> impl Iterator<Item = &Warning> {
        self.warnings
            .iter()
            .filter(|w| w.kind != WarningKind::DeferredDeclaration)
    }

    pub fn has_reportable(&self) -> bool {
        self.reportable().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}
