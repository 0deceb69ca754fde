//! Client artifact lookup inside a version metadata document.
//!
//! Only the object stored under `downloads.client` describes the client jar.
//! Server downloads and `logging.client` carry their own `url` and `sha1`,
//! so every lookup is bounded to that one object.

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::{extract_field, require_field};

const DOWNLOADS_KEY: &str = "\"downloads\":";
const CLIENT_KEY: &str = "\"client\":";

/// Client artifact URL of a version metadata document.
///
/// Taken from the `downloads.client` object when the document has one; a
/// client object without a `url` is an error. Documents without that object
/// fall back to their first `url`.
pub fn artifact_url(metadata: &str) -> LauncherResult<&str> {
    match client_object(metadata) {
        Some(client) => match extract_field(client, "url") {
            "" => Err(LauncherError::MissingField { field: "url" }),
            url => Ok(url),
        },
        None => require_field(metadata, "url"),
    }
}

/// Expected SHA-1 of the client artifact, when the metadata carries one.
pub fn artifact_sha1(metadata: &str) -> Option<&str> {
    let client = client_object(metadata)?;
    Some(extract_field(client, "sha1")).filter(|sha1| !sha1.is_empty())
}

/// The first `downloads` object with a direct `client` key, returning that
/// client object with its braces.
fn client_object(metadata: &str) -> Option<&str> {
    let mut from = 0;
    while let Some(found) = metadata[from..].find(DOWNLOADS_KEY) {
        let value_at = from + found + DOWNLOADS_KEY.len();
        let client = object_at(metadata, value_at).and_then(|d| direct_child(d, CLIENT_KEY));
        if client.is_some() {
            return client;
        }
        from = value_at;
    }
    None
}

/// The object value starting at `pos` (leading whitespace allowed), or
/// `None` when the value is not an object or never closes.
fn object_at(text: &str, pos: usize) -> Option<&str> {
    let rest = &text[pos..];
    let start = pos + (rest.len() - rest.trim_start().len());
    if !text[start..].starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    for (idx, ch) in structural_chars(&text[start..]) {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + idx]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Object value of `key` (quoted, with its colon) directly inside `object`.
fn direct_child<'a>(object: &'a str, key: &str) -> Option<&'a str> {
    let mut depth = 0usize;
    for (idx, ch) in structural_chars(object) {
        match ch {
            '"' if depth == 1 && object[idx..].starts_with(key) => {
                if let Some(child) = object_at(object, idx + key.len()) {
                    return Some(child);
                }
            }
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

/// Characters outside string literals, plus each literal's opening quote.
fn structural_chars(text: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut in_string = false;
    let mut escaped = false;
    text.char_indices().filter(move |&(_, ch)| {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            return false;
        }
        if ch == '"' {
            in_string = true;
        }
        true
    })
}
