// ─── Field Extractor ───
// Pulls string-valued fields out of JSON-like text without a parser.
//
// Matching is literal: `"<name>":"<value>"` with no whitespace around the
// colon. Escaped quotes inside a value end the value early, the first
// occurrence anywhere in the text wins (nested objects included), and
// numeric/boolean/array values are never matched. Callers rely on this
// exact behaviour; do not swap in a real JSON parser here.

use crate::core::error::{LauncherError, LauncherResult};

/// Value of the first `"<name>":"<value>"` in `text`, or `""` when the
/// field is absent, unterminated or not a string.
pub fn extract_field<'a>(text: &'a str, name: &str) -> &'a str {
    let needle = format!("\"{name}\":\"");
    let Some(found) = text.find(&needle) else {
        return "";
    };

    let start = found + needle.len();
    match text[start..].find('"') {
        Some(len) => &text[start..start + len],
        None => "",
    }
}

/// Like [`extract_field`], but an empty value is a [`LauncherError::MissingField`].
pub fn require_field<'a>(text: &'a str, name: &'static str) -> LauncherResult<&'a str> {
    match extract_field(text, name) {
        "" => Err(LauncherError::MissingField { field: name }),
        value => Ok(value),
    }
}
