//! @dose
//! purpose: Renders the Cython declaration file of one documentation unit from its
//!     ExtractionResult: a fixed banner and import preamble, then every section marker
//!     followed by its declarations and their documentation as comments.
//!
//! when-editing:
//!     - !Output must be byte-identical for identical inputs; never iterate a HashMap here
//!     - The extension fragment is appended verbatim after one blank line
//!
//! invariants:
//!     - Sections without declarations produce no output
//!     - Every generated file ends with a single newline
//!
//! gotchas:
//!     - Empty documentation lines render as a bare "    #" to avoid trailing whitespace

use crate::types::ExtractionResult;

/// Width of the '#' rule framing the generated-file banner
const BANNER_WIDTH: usize = 80;

/// Settings shared by every rendered unit
#[derive(Debug, Clone)]
pub struct PxdSettings<'a> {
    /// Library name used in distutils lines and the depends path
    pub library: &'a str,
    /// Header the extern block includes
    pub wrap_header: &'a str,
    /// Lines emitted after the banner
    pub preamble_imports: &'a [String],
}

/// Render a unit's .pxd content
pub fn format_pxd(
    unit: &str,
    result: &ExtractionResult,
    settings: &PxdSettings<'_>,
    fragment: Option<&str>,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    let rule = "#".repeat(BANNER_WIDTH);

    lines.push(format!("# distutils: libraries = {}", settings.library));
    lines.push(format!(
        "# distutils: depends = {}/{}.h",
        settings.library, unit
    ));
    lines.push(String::new());
    lines.push(rule.clone());
    lines.push("# This file is auto-generated. Do not modify by hand".to_string());
    lines.push(rule);
    lines.push(String::new());

    lines.extend(settings.preamble_imports.iter().cloned());
    lines.push(String::new());

    lines.push(format!("cdef extern from \"{}\":", settings.wrap_header));

    for section in result.sections() {
        if section.declarations.is_empty() {
            continue;
        }
        if let Some(ref name) = section.name {
            lines.push(format!("    ## {}", name));
        }
        for decl in &section.declarations {
            lines.push(String::new());
            lines.extend(decl.signatures.iter().map(|sig| format!("    {}", sig)));
            lines.extend(decl.documentation.iter().map(|doc| format_doc_line(doc)));
        }
    }

    let mut content = lines.join("\n");
    content.push('\n');

    if let Some(fragment) = fragment {
        content.push('\n');
        content.push_str(fragment);
        if !fragment.ends_with('\n') {
            content.push('\n');
        }
    }

    content
}

fn format_doc_line(line: &str) -> String {
    if line.is_empty() {
        "    #".to_string()
    } else {
        format!("    # {}", line)
    }
}
