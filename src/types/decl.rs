//! @dose
//! purpose: Core data model shared by the extractor, the normalizer and the writers:
//!     declarations, sections and the section-keyed extraction result of one unit.
//!
//! when-editing:
//!     - !ExtractionResult keeps sections in first-seen order; never replace it with a HashMap
//!     - !A reappearing section name appends to the existing section, it never replaces it
//!     - Declarations are immutable once pushed into a section
//!
//! invariants:
//!     - Declaration order within a section equals source order
//!     - The unnamed section (name None) holds declarations that precede the first header
//!     - documentation never ends with an empty entry once normalized
//!
//! gotchas:
//!     - Named sections may be present with zero declarations (header followed by macros only)
//!     - declaration_count() is what decides whether a unit is worth emitting

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a documented declaration, taken from its directive marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Function,
    Macro,
    Type,
}

impl DeclKind {
    /// Directive text that opens a declaration of this kind
    pub fn marker(self) -> &'static str {
        match self {
            DeclKind::Function => ".. function::",
            DeclKind::Macro => ".. macro::",
            DeclKind::Type => ".. type::",
        }
    }

    /// Minimum indentation of a signature continuation line.
    /// Types never continue their signature.
    pub fn continuation_indent(self) -> Option<usize> {
        match self {
            DeclKind::Function => Some(14),
            DeclKind::Macro => Some(10),
            DeclKind::Type => None,
        }
    }

    pub const ALL: [DeclKind; 3] = [DeclKind::Function, DeclKind::Macro, DeclKind::Type];
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclKind::Function => "function",
            DeclKind::Macro => "macro",
            DeclKind::Type => "type",
        };
        f.write_str(name)
    }
}

/// A parsed declaration: one or more signature lines sharing one documentation body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclKind,
    /// Raw (or, once normalized, cleaned) signature fragments in source order
    pub signatures: Vec<String>,
    /// Documentation lines; empty strings mark paragraph breaks
    pub documentation: Vec<String>,
}

impl Declaration {
    pub fn new(kind: DeclKind, signatures: Vec<String>, documentation: Vec<String>) -> Self {
        Self {
            kind,
            signatures,
            documentation,
        }
    }
}

/// A named group of declarations. `name` is None for declarations preceding the first header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: Option<String>,
    pub declarations: Vec<Declaration>,
}

/// Section-keyed declarations of one documentation unit, in first-seen section order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    sections: Vec<Section>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a section without adding declarations. No-op if it already exists.
    pub fn open_section(&mut self, name: Option<&str>) {
        self.section_mut(name);
    }

    /// Append declarations to a section, creating it at the end if it was never seen.
    pub fn extend_section(&mut self, name: Option<&str>, declarations: Vec<Declaration>) {
        self.section_mut(name).declarations.extend(declarations);
    }

    fn section_mut(&mut self, name: Option<&str>) -> &mut Section {
        let index = match self
            .sections
            .iter()
            .position(|s| s.name.as_deref() == name)
        {
            Some(index) => index,
            None => {
                self.sections.push(Section {
                    name: name.map(str::to_string),
                    declarations: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    pub fn get(&self, name: Option<&str>) -> Option<&Section> {
        self.sections.iter().find(|s| s.name.as_deref() == name)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Total number of emitted declarations across all sections
    pub fn declaration_count(&self) -> usize {
        self.sections.iter().map(|s| s.declarations.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.declaration_count() == 0
    }
}
