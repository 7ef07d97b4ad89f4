//! Line classification for reStructuredText API documentation.
//!
//! A line is classified on its own plus a one-line lookahead (for section underlines).
//! Whether indented content counts as a signature continuation or as documentation
//! depends on parser state, so that refinement lives on [`LineShape`] helpers and is
//! decided by the extractor.

use crate::types::DeclKind;

/// Indentation of documentation lines under a declaration
pub const DOC_INDENT: usize = 4;

/// Directive marker found at the start of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'a> {
    pub kind: DeclKind,
    /// Text after the marker, trimmed
    pub signature: &'a str,
    /// Whether the marker keyword is followed by a space
    pub spaced: bool,
}

/// Shape of one input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape<'a> {
    /// `.. function::`, `.. macro::` or `.. type::`
    Marker(Marker<'a>),
    /// Empty or whitespace-only
    Blank,
    /// Any other line
    Content {
        /// Raw line, needed to strip a fixed indent
        raw: &'a str,
        /// Count of leading spaces
        indent: usize,
        /// Whether the next line is a dash underline
        underlined: bool,
    },
}

impl<'a> LineShape<'a> {
    /// Signature continuation text if this line is indented by at least `threshold`
    /// columns. Returns `Some("")` for an indented line that trims to nothing.
    pub fn continuation(&self, threshold: usize) -> Option<&'a str> {
        match *self {
            LineShape::Content { raw, indent, .. } if indent >= threshold => {
                Some(raw[threshold..].trim())
            }
            _ => None,
        }
    }

    /// Documentation text if this line is indented like a declaration body
    pub fn documentation(&self) -> Option<&'a str> {
        self.continuation(DOC_INDENT)
    }

    /// Section title if this line is followed by a dash underline
    pub fn section_title(&self) -> Option<&'a str> {
        match *self {
            LineShape::Content {
                raw,
                underlined: true,
                ..
            } => Some(raw.trim()),
            _ => None,
        }
    }
}

/// Classify `line`, looking at `next` only to detect a section underline
pub fn classify<'a>(line: &'a str, next: Option<&str>) -> LineShape<'a> {
    for kind in DeclKind::ALL {
        if let Some(rest) = line.strip_prefix(kind.marker()) {
            return LineShape::Marker(Marker {
                kind,
                signature: rest.trim(),
                spaced: rest.starts_with(' '),
            });
        }
    }

    if line.trim().is_empty() {
        return LineShape::Blank;
    }

    LineShape::Content {
        raw: line,
        indent: line.len() - line.trim_start_matches(' ').len(),
        underlined: next.is_some_and(is_underline),
    }
}

/// A line consisting solely of a run of dashes
pub fn is_underline(line: &str) -> bool {
    let line = line.trim_end();
    !line.is_empty() && line.bytes().all(|b| b == b'-')
}
