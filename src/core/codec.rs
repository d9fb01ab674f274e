//! Body text coding.
//!
//! Message bodies are stored either as plain text or, for some legacy
//! message types, base64-encoded. Nothing in the record says which, so the
//! codec guesses: a body whose character count is a multiple of four and
//! that ends with `=` is treated as encoded. If decoding fails or the bytes
//! are not UTF-8, the body is used as plain text instead.
//!
//! The guess has a known false positive: a plain body that happens to be
//! valid base64 of UTF-8 text is rendered decoded. This is kept for
//! compatibility with existing exports.
//!
//! # Example
//!
//! ```
//! use chatexport::core::codec::decode;
//!
//! assert_eq!(decode("a < b").unwrap().as_str(), "a &lt; b");
//! assert_eq!(decode("SGVsbG8=").unwrap().as_str(), "Hello");
//! assert!(decode("").is_none());
//! ```

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

/// Escaped text, safe to place verbatim inside a markup text node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayText(String);

impl DisplayText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escapes the five markup-significant characters `& < > " '`.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Returns `true` if the body is treated as base64.
pub fn looks_encoded(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().count() % 4 == 0 && raw.ends_with('=')
}

/// Turns a raw body into display text.
///
/// Returns `None` for an empty body, so no text node is emitted.
pub fn decode(raw: &str) -> Option<DisplayText> {
    if raw.is_empty() {
        return None;
    }

    if looks_encoded(raw) {
        match STANDARD.decode(raw) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => return Some(DisplayText(escape(&text))),
                Err(e) => debug!("decoded body is not UTF-8, using raw text: {e}"),
            },
            Err(e) => debug!("body looked encoded but did not decode: {e}"),
        }
    }

    Some(DisplayText(escape(raw)))
}
