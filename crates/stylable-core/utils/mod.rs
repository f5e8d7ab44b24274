//! Shared utilities: error types and hashing helpers.

pub mod errors;
pub mod hashers;

pub use errors::{CoreError, ErrorCategory, Result};
pub use hashers::{create_hash_map, create_hash_set};

/// Strip one pair of matching `"` or `'` quotes from a value.
///
/// # Example
///
/// ```rust
/// use stylable_core::utils::unquote;
///
/// assert_eq!(unquote("\"./file\""), "./file");
/// assert_eq!(unquote("'a'"), "a");
/// assert_eq!(unquote("plain"), "plain");
/// ```
#[must_use]
pub fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' || first == b'\'') && first == last {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Check whether a character may appear inside a CSS identifier.
#[must_use]
pub fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

/// Split `text` on commas that are not nested in parentheses or quotes.
///
/// Returns each piece with its byte offset into `text`; pieces are not trimmed.
#[must_use]
pub fn split_top_level(text: &str, separator: char) -> Vec<(usize, &str)> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if ch == separator && depth == 0 => {
                parts.push((start, &text[start..idx]));
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push((start, &text[start..]));
    parts
}

/// Byte offset of the first non-whitespace character of `text`, or its length.
#[must_use]
pub fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}
