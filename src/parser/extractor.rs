//! @dose
//! purpose: Line-oriented state machine that turns one reStructuredText documentation unit
//!     into a section-keyed list of declarations. Recognizes declaration markers, multi-line
//!     signatures, documentation bodies and section headers, and assembles sections.
//!
//! when-editing:
//!     - !Rules are evaluated in a fixed priority order inside decide(); keep it in sync with the tests
//!     - !decide() is pure: it only looks at the current state and line shape
//!     - A Reprocess action must leave the parser Idle, otherwise the line loop would not advance
//!
//! invariants:
//!     - Every input line is consumed exactly once (Reprocess re-evaluates without consuming)
//!     - A pending declaration is always finalized, including at end of input
//!     - Only function declarations reach the result; macros and types are recorded as deferred
//!     - A reappearing section header appends to the existing section
//!
//! error-handling:
//!     - A non-continuation, non-blank line directly under a function/macro signature is fatal
//!     - Normalizer errors (unbalanced signature) propagate unchanged
//!
//! gotchas:
//!     - The Doc flag is entered on the first blank line after a signature, not on the first doc line
//!     - Declarations before the first section header land in the unnamed section
//!     - Section headers are only recognized outside strict signature state
//!
//! flows:
//!     - Per line: classify (with lookahead) -> decide(state, shape) -> apply action
//!     - Finalize: normalize pending declaration -> push to current section buffer
//!     - Section boundary / end of input: flush buffer into the ExtractionResult

use crate::parser::line::{classify, LineShape, Marker};
use crate::parser::normalize::Normalizer;
use crate::parser::ExtractError;
use crate::types::{DeclKind, Declaration, Diagnostics, ExtractionResult, WarningKind};
use std::fmt;

/// Position of the parser inside a documentation unit.
///
/// `doc` is set once the signature block ended and documentation lines are collected
/// for the declaration that is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    #[default]
    Idle,
    InFunctionDecl { doc: bool },
    InMacroDecl { doc: bool },
    InTypeDecl { doc: bool },
}

impl ParserState {
    fn open(kind: DeclKind, doc: bool) -> Self {
        match kind {
            DeclKind::Function => ParserState::InFunctionDecl { doc },
            DeclKind::Macro => ParserState::InMacroDecl { doc },
            DeclKind::Type => ParserState::InTypeDecl { doc },
        }
    }

    /// Kind of the declaration being collected, if any
    pub fn kind(self) -> Option<DeclKind> {
        match self {
            ParserState::Idle => None,
            ParserState::InFunctionDecl { .. } => Some(DeclKind::Function),
            ParserState::InMacroDecl { .. } => Some(DeclKind::Macro),
            ParserState::InTypeDecl { .. } => Some(DeclKind::Type),
        }
    }

    pub fn in_doc(self) -> bool {
        match self {
            ParserState::Idle => false,
            ParserState::InFunctionDecl { doc }
            | ParserState::InMacroDecl { doc }
            | ParserState::InTypeDecl { doc } => doc,
        }
    }
}

impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            None => f.write_str("idle"),
            Some(kind) if self.in_doc() => write!(f, "{kind} documentation"),
            Some(kind) => write!(f, "{kind} signature"),
        }
    }
}

/// What to do with the current line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    /// Finalize anything pending and open a new declaration
    Start(Marker<'a>),
    /// Add a signature fragment (empty fragments are ignored)
    Signature(&'a str),
    /// End the signature block and start collecting documentation
    BeginDoc,
    /// Add a documentation line (empty marks a paragraph break)
    Doc(&'a str),
    /// Finalize, flush the section, and open a new one; consumes the underline too
    Section(&'a str),
    /// Consume the line without effect
    Skip,
    /// Finalize the pending declaration and evaluate the same line again
    Reprocess,
    /// The line cannot appear here
    Unexpected,
}

/// Transition function of the extractor. Pure over (state, line shape).
pub fn decide<'a>(state: ParserState, shape: &LineShape<'a>) -> Action<'a> {
    // 1. Markers always win
    if let LineShape::Marker(marker) = shape {
        return Action::Start(*marker);
    }

    // 2-3. Strict signature state of functions and macros
    if let Some(kind) = state.kind() {
        if !state.in_doc() {
            if let Some(threshold) = kind.continuation_indent() {
                if let Some(fragment) = shape.continuation(threshold) {
                    return Action::Signature(fragment);
                }
                return match shape {
                    LineShape::Blank => Action::BeginDoc,
                    _ => Action::Unexpected,
                };
            }
            // Types have no continuation lines
            if *shape == LineShape::Blank {
                return Action::BeginDoc;
            }
        }
    }

    // 4. Documentation body
    if state.in_doc() {
        if *shape == LineShape::Blank {
            return Action::Doc("");
        }
        if let Some(text) = shape.documentation() {
            return Action::Doc(text);
        }
    }

    // 5. Section boundary
    if let Some(title) = shape.section_title() {
        return Action::Section(title);
    }

    match state {
        // 6. Blank lines and prose outside declarations
        ParserState::Idle => Action::Skip,
        // 7. Anything else closes the pending declaration
        _ => Action::Reprocess,
    }
}

/// Declaration under construction
#[derive(Debug)]
struct Pending {
    kind: DeclKind,
    signatures: Vec<String>,
    documentation: Vec<String>,
}

/// Extractor over one documentation unit
pub struct Extractor<'a> {
    unit: &'a str,
    normalizer: &'a Normalizer,
    state: ParserState,
    pending: Option<Pending>,
    /// Active section; None before the first header
    section: Option<String>,
    /// Finalized declarations not yet flushed into `result`
    functions: Vec<Declaration>,
    result: ExtractionResult,
}

impl<'a> Extractor<'a> {
    pub fn new(unit: &'a str, normalizer: &'a Normalizer) -> Self {
        Self {
            unit,
            normalizer,
            state: ParserState::Idle,
            pending: None,
            section: None,
            functions: Vec::new(),
            result: ExtractionResult::new(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Run over the whole text and return the section-keyed result
    pub fn run(
        mut self,
        text: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<ExtractionResult, ExtractError> {
        let lines: Vec<&str> = text.lines().collect();
        let mut i = 0;

        while i < lines.len() {
            let shape = classify(lines[i], lines.get(i + 1).copied());
            i += self.apply(decide(self.state, &shape), i, lines[i], diagnostics)?;
        }

        self.finalize(diagnostics)?;
        self.flush_section();
        Ok(self.result)
    }

    /// Apply one action; returns how many lines were consumed
    fn apply(
        &mut self,
        action: Action<'_>,
        index: usize,
        line: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<usize, ExtractError> {
        match action {
            Action::Start(marker) => {
                self.finalize(diagnostics)?;
                if !marker.spaced {
                    diagnostics.warn(
                        WarningKind::MissingSpace,
                        self.unit,
                        format!("line {}: no space after `{}`", index + 1, marker.kind.marker()),
                    );
                }
                let mut signatures = Vec::new();
                if !marker.signature.is_empty() {
                    signatures.push(marker.signature.to_string());
                }
                self.pending = Some(Pending {
                    kind: marker.kind,
                    signatures,
                    documentation: Vec::new(),
                });
                self.state = ParserState::open(marker.kind, false);
                Ok(1)
            }
            Action::Signature(fragment) => {
                if !fragment.is_empty() {
                    if let Some(pending) = self.pending.as_mut() {
                        pending.signatures.push(fragment.to_string());
                    }
                }
                Ok(1)
            }
            Action::BeginDoc => {
                if let Some(kind) = self.state.kind() {
                    self.state = ParserState::open(kind, true);
                }
                Ok(1)
            }
            Action::Doc(text) => {
                if let Some(pending) = self.pending.as_mut() {
                    // Leading blank lines carry no information
                    if !text.is_empty() || !pending.documentation.is_empty() {
                        pending.documentation.push(text.to_string());
                    }
                }
                Ok(1)
            }
            Action::Section(title) => {
                self.finalize(diagnostics)?;
                self.flush_section();
                self.result.open_section(Some(title));
                self.section = Some(title.to_string());
                Ok(2)
            }
            Action::Skip => Ok(1),
            Action::Reprocess => {
                self.finalize(diagnostics)?;
                Ok(0)
            }
            Action::Unexpected => Err(ExtractError::UnexpectedLine {
                unit: self.unit.to_string(),
                line: index + 1,
                state: self.state.to_string(),
                text: line.to_string(),
            }),
        }
    }

    /// Close the pending declaration, if any, and return to Idle
    fn finalize(&mut self, diagnostics: &mut Diagnostics) -> Result<(), ExtractError> {
        self.state = ParserState::Idle;
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };

        let decl = Declaration::new(pending.kind, pending.signatures, pending.documentation);
        let Some(decl) = self.normalizer.normalize(decl, self.unit, diagnostics)? else {
            return Ok(());
        };

        match decl.kind {
            DeclKind::Function => self.functions.push(decl),
            DeclKind::Macro | DeclKind::Type => diagnostics.warn(
                WarningKind::DeferredDeclaration,
                self.unit,
                format!("{} not emitted: {}", decl.kind, decl.signatures.join("; ")),
            ),
        }
        Ok(())
    }

    fn flush_section(&mut self) {
        if self.functions.is_empty() {
            return;
        }
        let functions = std::mem::take(&mut self.functions);
        self.result
            .extend_section(self.section.as_deref(), functions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizeConfig;

    fn extract(text: &str) -> (ExtractionResult, Diagnostics) {
        let normalizer = Normalizer::new(&NormalizeConfig::default()).unwrap();
        let mut diag = Diagnostics::new();
        let result = Extractor::new("test", &normalizer)
            .run(text, &mut diag)
            .unwrap();
        (result, diag)
    }

    fn extract_err(text: &str) -> ExtractError {
        let normalizer = Normalizer::new(&NormalizeConfig::default()).unwrap();
        let mut diag = Diagnostics::new();
        Extractor::new("test", &normalizer)
            .run(text, &mut diag)
            .unwrap_err()
    }

    fn signatures(result: &ExtractionResult, section: Option<&str>) -> Vec<Vec<String>> {
        result
            .get(section)
            .map(|s| s.declarations.iter().map(|d| d.signatures.clone()).collect())
            .unwrap_or_default()
    }

    // ==================== decide() Tests ====================

    #[test]
    fn test_decide_marker_from_any_state() {
        let shape = classify(".. function:: void f()", None);
        for state in [
            ParserState::Idle,
            ParserState::InFunctionDecl { doc: false },
            ParserState::InMacroDecl { doc: true },
            ParserState::InTypeDecl { doc: false },
        ] {
            assert!(matches!(decide(state, &shape), Action::Start(_)));
        }
    }

    #[test]
    fn test_decide_continuation_thresholds() {
        let fn_cont = classify("              void g(int x)", None);
        let macro_cont = classify("          MACRO_B(x)", None);

        assert_eq!(
            decide(ParserState::InFunctionDecl { doc: false }, &fn_cont),
            Action::Signature("void g(int x)")
        );
        assert_eq!(
            decide(ParserState::InMacroDecl { doc: false }, &macro_cont),
            Action::Signature("MACRO_B(x)")
        );
        // 10 columns is not enough for a function
        assert_eq!(
            decide(ParserState::InFunctionDecl { doc: false }, &macro_cont),
            Action::Unexpected
        );
    }

    #[test]
    fn test_decide_blank_starts_doc() {
        for state in [
            ParserState::InFunctionDecl { doc: false },
            ParserState::InMacroDecl { doc: false },
            ParserState::InTypeDecl { doc: false },
        ] {
            assert_eq!(decide(state, &LineShape::Blank), Action::BeginDoc);
        }
        assert_eq!(decide(ParserState::Idle, &LineShape::Blank), Action::Skip);
        assert_eq!(
            decide(ParserState::InFunctionDecl { doc: true }, &LineShape::Blank),
            Action::Doc("")
        );
    }

    #[test]
    fn test_decide_doc_lines() {
        let shape = classify("    Sets ``f`` to zero.", None);
        assert_eq!(
            decide(ParserState::InFunctionDecl { doc: true }, &shape),
            Action::Doc("Sets ``f`` to zero.")
        );
        // Indented prose outside a declaration is ignored
        assert_eq!(decide(ParserState::Idle, &shape), Action::Skip);
    }

    #[test]
    fn test_decide_section_and_reprocess() {
        let header = classify("Comparison", Some("----------"));
        assert_eq!(
            decide(ParserState::InFunctionDecl { doc: true }, &header),
            Action::Section("Comparison")
        );
        assert_eq!(decide(ParserState::Idle, &header), Action::Section("Comparison"));

        let prose = classify("Some unindented prose.", None);
        assert_eq!(
            decide(ParserState::InFunctionDecl { doc: true }, &prose),
            Action::Reprocess
        );
        assert_eq!(
            decide(ParserState::InTypeDecl { doc: false }, &prose),
            Action::Reprocess
        );
        assert_eq!(decide(ParserState::Idle, &prose), Action::Skip);
    }

    #[test]
    fn test_decide_strict_state_rejects_header() {
        let header = classify("Comparison", Some("----------"));
        assert_eq!(
            decide(ParserState::InFunctionDecl { doc: false }, &header),
            Action::Unexpected
        );
    }

    // ==================== Extractor Tests ====================

    #[test]
    fn test_reference_example() {
        let text = ".. function:: int foo(int in)\n\n    Returns something.\n\nBar\n---\n\n.. macro:: BAZ(x)\n";
        let (result, diag) = extract(text);

        let unnamed = result.get(None).unwrap();
        assert_eq!(unnamed.declarations.len(), 1);
        let foo = &unnamed.declarations[0];
        assert_eq!(foo.kind, DeclKind::Function);
        assert_eq!(foo.signatures, vec!["int foo(int input)"]);
        assert_eq!(foo.documentation, vec!["Returns something."]);

        let bar = result.get(Some("Bar")).unwrap();
        assert!(bar.declarations.is_empty());

        assert_eq!(result.sections().len(), 2);
        assert_eq!(diag.count(WarningKind::NameCollision), 1);
        assert_eq!(diag.count(WarningKind::DeferredDeclaration), 1);
    }

    #[test]
    fn test_multiline_signature() {
        let text = "\
.. function:: void fmpz_add(fmpz_t f, const fmpz_t g, const fmpz_t h)
              void fmpz_add_ui(fmpz_t f, const fmpz_t g, ulong x)
              void fmpz_add_si(fmpz_t f, const fmpz_t g, slong x)

    Sets ``f`` to `g + h`.
";
        let (result, _) = extract(text);
        assert_eq!(
            signatures(&result, None),
            vec![vec![
                "void fmpz_add(fmpz_t f, const fmpz_t g, const fmpz_t h)".to_string(),
                "void fmpz_add_ui(fmpz_t f, const fmpz_t g, ulong x)".to_string(),
                "void fmpz_add_si(fmpz_t f, const fmpz_t g, slong x)".to_string(),
            ]]
        );
    }

    #[test]
    fn test_documentation_paragraphs() {
        let text = "\
.. function:: void f()


    First paragraph
    continues here.

    Second paragraph.



.. function:: void g()
";
        let (result, _) = extract(text);
        let decls = &result.get(None).unwrap().declarations;
        assert_eq!(
            decls[0].documentation,
            vec!["First paragraph", "continues here.", "", "Second paragraph."]
        );
        assert!(decls[1].documentation.is_empty());
    }

    #[test]
    fn test_sections_in_first_seen_order() {
        let text = "\
Memory management
--------------------------------------------------------------------------------

.. function:: void fmpz_init(fmpz_t f)

Basic properties
--------------------------------------------------------------------------------

.. function:: slong fmpz_size(const fmpz_t f)

.. function:: int fmpz_sgn(const fmpz_t f)
";
        let (result, _) = extract(text);
        let names: Vec<_> = result.sections().iter().map(|s| s.name.clone()).collect();
        assert_eq!(
            names,
            vec![
                Some("Memory management".to_string()),
                Some("Basic properties".to_string())
            ]
        );
        assert_eq!(
            signatures(&result, Some("Basic properties")),
            vec![
                vec!["slong fmpz_size(const fmpz_t f)".to_string()],
                vec!["int fmpz_sgn(const fmpz_t f)".to_string()],
            ]
        );
        assert!(result.get(None).is_none());
    }

    #[test]
    fn test_reappearing_section_appends() {
        let text = "\
Arithmetic
----------

.. function:: void a()

Printing
--------

.. function:: void b()

Arithmetic
----------

.. function:: void c()
";
        let (result, _) = extract(text);
        assert_eq!(result.sections().len(), 2);
        assert_eq!(
            signatures(&result, Some("Arithmetic")),
            vec![vec!["void a()".to_string()], vec!["void c()".to_string()]]
        );
    }

    #[test]
    fn test_end_of_input_finalizes() {
        let (result, _) = extract(".. function:: void f()");
        assert_eq!(signatures(&result, None), vec![vec!["void f()".to_string()]]);

        let (result, _) = extract(".. function:: void f()\n\n    Last words.");
        let decl = &result.get(None).unwrap().declarations[0];
        assert_eq!(decl.documentation, vec!["Last words."]);
    }

    #[test]
    fn test_prose_closes_declaration() {
        let text = "\
.. function:: void f()

    Doc of f.

This paragraph talks about f
but is not its documentation.

.. function:: void g()
";
        let (result, _) = extract(text);
        let decls = &result.get(None).unwrap().declarations;
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].documentation, vec!["Doc of f."]);
    }

    #[test]
    fn test_unexpected_line_in_signature_is_fatal() {
        let err = extract_err(".. function:: void f()\nnot a continuation\n");
        match err {
            ExtractError::UnexpectedLine { line, text, .. } => {
                assert_eq!(line, 2);
                assert_eq!(text, "not a continuation");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unbalanced_signature_is_fatal() {
        let err = extract_err(".. function:: int broken\n");
        assert!(matches!(err, ExtractError::UnbalancedSignature { .. }));
    }

    #[test]
    fn test_bare_function_marker_is_fatal() {
        let err = extract_err(".. function::\n\n    Orphan doc.\n\n.. function:: void g()\n");
        match err {
            ExtractError::UnbalancedSignature { signature, .. } => assert_eq!(signature, ""),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bare_macro_marker_is_deferred() {
        let (result, diag) = extract(".. macro::\n\n    Nothing here.\n\n.. function:: void g()\n");
        assert_eq!(signatures(&result, None), vec![vec!["void g()".to_string()]]);
        assert_eq!(diag.count(WarningKind::DeferredDeclaration), 1);
    }

    #[test]
    fn test_variadic_absent_from_result() {
        let text = "\
Printing
--------

.. function:: int flint_printf(const char * str, ...)

    Prints.

.. function:: void flint_print_ok(void)
";
        let (result, diag) = extract(text);
        assert_eq!(
            signatures(&result, Some("Printing")),
            vec![vec!["void flint_print_ok()".to_string()]]
        );
        assert_eq!(diag.count(WarningKind::UnsupportedConstruct), 1);
    }

    #[test]
    fn test_types_and_macros_not_emitted() {
        let text = "\
Types
-----

.. type:: fmpz_t

    An array of length one.

.. macro:: COEFF_MAX
           COEFF_MIN

    Bounds of small integers.

.. function:: void fmpz_init(fmpz_t f)
";
        let (result, diag) = extract(text);
        assert_eq!(
            signatures(&result, Some("Types")),
            vec![vec!["void fmpz_init(fmpz_t f)".to_string()]]
        );
        assert_eq!(diag.count(WarningKind::DeferredDeclaration), 2);
    }

    #[test]
    fn test_missing_space_warns() {
        let (result, diag) = extract(".. function::void f()\n");
        assert_eq!(signatures(&result, None), vec![vec!["void f()".to_string()]]);
        assert_eq!(diag.count(WarningKind::MissingSpace), 1);
    }

    #[test]
    fn test_idempotent() {
        let text = include_str!("../../test_fixtures/sample.rst");
        let (first, _) = extract(text);
        let (second, _) = extract(text);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_sample_fixture() {
        let (result, diag) = extract(include_str!("../../test_fixtures/sample.rst"));
        let names: Vec<_> = result
            .sections()
            .iter()
            .map(|s| s.name.as_deref().unwrap_or("<none>").to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Types, macros and constants",
                "Memory management",
                "Basic arithmetic",
                "Input and output",
            ]
        );
        assert!(result.get(Some("Types, macros and constants")).unwrap().declarations.is_empty());
        assert_eq!(result.get(Some("Memory management")).unwrap().declarations.len(), 3);
        assert_eq!(
            signatures(&result, Some("Basic arithmetic"))[1],
            vec![
                "void fmpz_demo_mul(fmpz_demo_t res, const fmpz_demo_t x, const fmpz_demo_t y)"
                    .to_string(),
                "void fmpz_demo_mul_ui(fmpz_demo_t res, const fmpz_demo_t x, ulong y)".to_string(),
            ]
        );
        assert_eq!(
            signatures(&result, Some("Input and output")),
            vec![vec!["int fmpz_demo_print(const fmpz_demo_t input)".to_string()]]
        );
        assert_eq!(diag.count(WarningKind::UnsupportedConstruct), 1);
        assert_eq!(diag.count(WarningKind::NameCollision), 1);
    }
}
