//! @dose
//! purpose: Signature normalizer applied to every finalized function or macro declaration.
//!     Cleans signature text, renames reserved parameter names, validates structure and
//!     drops variadic prototypes, then tidies the documentation body.
//!
//! when-editing:
//!     - !Steps run in a fixed order: cleanup, reserved renaming, structure check, variadic drop, doc cleanup
//!     - !Reserved renaming must only touch whole parameter tokens, never substrings
//!     - All tables come from NormalizeConfig; tests pass minimal fixtures
//!
//! invariants:
//!     - "(void)" never survives normalization with the default tables
//!     - Every actual renaming is recorded with the signature before and after
//!     - A function signature without both '(' and ')' is a fatal ExtractError
//!
//! gotchas:
//!     - Macros skip the structure check (object-like macros have no parentheses)
//!     - Variadic fragments are dropped one by one; the declaration disappears only when none is left

use crate::config::{ConfigError, NormalizeConfig};
use crate::parser::ExtractError;
use crate::types::{DeclKind, Declaration, Diagnostics, WarningKind};
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// A reserved parameter name with its compiled matcher
#[derive(Debug)]
struct ReservedName {
    name: String,
    /// Matches the name as a parameter token: preceded by whitespace or `*`,
    /// followed by `,` or `)`
    pattern: Regex,
    replacement: String,
}

/// Compiled normalizer tables
#[derive(Debug)]
pub struct Normalizer {
    signature_replacements: Vec<(String, String)>,
    reserved: Vec<ReservedName>,
    doc_escapes: Vec<(String, String)>,
    variadic_markers: Vec<String>,
}

impl Normalizer {
    pub fn new(config: &NormalizeConfig) -> Result<Self, ConfigError> {
        let mut reserved = Vec::with_capacity(config.reserved.len());
        for (name, replacement) in &config.reserved {
            if !IDENTIFIER.is_match(name) || !IDENTIFIER.is_match(replacement) {
                return Err(ConfigError::ReservedIdentifier(name.clone()));
            }
            let pattern = Regex::new(&format!(r"([\s*]){}([,)])", regex::escape(name)))
                .map_err(|_| ConfigError::ReservedIdentifier(name.clone()))?;
            reserved.push(ReservedName {
                name: name.clone(),
                pattern,
                replacement: format!("${{1}}{}${{2}}", replacement),
            });
        }

        Ok(Self {
            signature_replacements: config.signature_replacements.clone(),
            reserved,
            doc_escapes: config.doc_escapes.clone(),
            variadic_markers: config.variadic_markers.clone(),
        })
    }

    /// Normalize a finalized declaration.
    ///
    /// Returns `Ok(None)` when every function signature was dropped as variadic. Types
    /// are returned untouched. A function without any signature text is unbalanced.
    pub fn normalize(
        &self,
        decl: Declaration,
        unit: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<Declaration>, ExtractError> {
        if decl.kind == DeclKind::Type {
            return Ok(Some(decl));
        }
        if decl.kind == DeclKind::Function && decl.signatures.is_empty() {
            return Err(ExtractError::UnbalancedSignature {
                unit: unit.to_string(),
                signature: String::new(),
            });
        }

        let mut signatures = Vec::with_capacity(decl.signatures.len());
        for raw in &decl.signatures {
            let cleaned = self.clean_signature(raw);
            let renamed = self.rename_reserved(&cleaned);
            if renamed != cleaned {
                diagnostics.warn(
                    WarningKind::NameCollision,
                    unit,
                    format!("renamed reserved parameter: `{}` -> `{}`", cleaned, renamed),
                );
            }

            if decl.kind == DeclKind::Function {
                if !renamed.contains('(') || !renamed.contains(')') {
                    return Err(ExtractError::UnbalancedSignature {
                        unit: unit.to_string(),
                        signature: raw.clone(),
                    });
                }
                if self.is_variadic(&renamed) {
                    diagnostics.warn(
                        WarningKind::UnsupportedConstruct,
                        unit,
                        format!("variadic signature dropped: {}", renamed),
                    );
                    continue;
                }
            }

            signatures.push(renamed);
        }

        if decl.kind == DeclKind::Function && signatures.is_empty() {
            return Ok(None);
        }

        Ok(Some(Declaration::new(
            decl.kind,
            signatures,
            self.clean_documentation(decl.documentation),
        )))
    }

    fn clean_signature(&self, signature: &str) -> String {
        self.signature_replacements
            .iter()
            .fold(signature.to_string(), |acc, (from, to)| acc.replace(from, to))
    }

    fn rename_reserved(&self, signature: &str) -> String {
        let mut result = signature.to_string();
        for reserved in &self.reserved {
            if !result.contains(&reserved.name) {
                continue;
            }
            result = reserved
                .pattern
                .replace_all(&result, reserved.replacement.as_str())
                .into_owned();
        }
        result
    }

    fn is_variadic(&self, signature: &str) -> bool {
        self.variadic_markers
            .iter()
            .any(|marker| signature.contains(marker.as_str()))
    }

    fn clean_documentation(&self, mut doc: Vec<String>) -> Vec<String> {
        while doc.last().is_some_and(|line| line.is_empty()) {
            doc.pop();
        }
        doc.into_iter()
            .map(|line| {
                self.doc_escapes
                    .iter()
                    .fold(line, |acc, (from, to)| acc.replace(from, to))
            })
            .collect()
    }
}
