//! Aggregate file templates: the umbrella header and the types declaration file.
//!
//! Templates contain a single `{HEADER_LIST}` placeholder. Doubled braces (`{{`, `}}`)
//! are literal braces so existing C template files keep working unchanged.

/// Placeholder substituted with the header list
pub const HEADER_LIST_PLACEHOLDER: &str = "{HEADER_LIST}";

/// Substitute the placeholder and unescape doubled braces
pub fn render_template(template: &str, header_list: &str) -> String {
    let mut out = String::with_capacity(template.len() + header_list.len());
    let mut rest = template;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix(HEADER_LIST_PLACEHOLDER) {
            out.push_str(header_list);
            rest = after;
        } else if let Some(after) = rest.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = rest.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }

    out
}

/// `#include <library/header>` lines for the umbrella header
pub fn wrap_header_list(library: &str, headers: &[String]) -> String {
    headers
        .iter()
        .map(|h| format!("#include <{}/{}>", library, h))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Space separated `library/header` list for types.pxd
pub fn types_header_list(library: &str, headers: &[String]) -> String {
    headers
        .iter()
        .map(|h| format!("{}/{}", library, h))
        .collect::<Vec<_>>()
        .join(" ")
}
