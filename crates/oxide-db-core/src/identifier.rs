//! SQL identifier validation, normalization and escaping.

use std::sync::LazyLock;

use regex::Regex;

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid identifier regex"));

/// Returns true if `text` is a valid SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    IDENTIFIER_REGEX.is_match(text)
}

/// Returns true if `c` may appear inside an identifier.
#[must_use]
pub const fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Maps arbitrary text to a valid identifier.
///
/// Whitespace is simplified first, every character that cannot appear in an
/// identifier becomes `_` (never two in a row), and a leading digit gets a `_`
/// prefix. Empty and all-whitespace input yield an empty string.
#[must_use]
pub fn string_to_identifier(text: &str) -> String {
    let simplified = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if simplified.is_empty() {
        return String::new();
    }

    let mut result = String::with_capacity(simplified.len() + 1);
    let mut was_underscore = false;
    for (i, c) in simplified.chars().enumerate() {
        if i == 0 && c.is_ascii_digit() {
            result.push('_');
            result.push(c);
            continue;
        }
        let mapped = if is_identifier_char(c) { c } else { '_' };
        if mapped == '_' {
            if was_underscore {
                continue;
            }
            was_underscore = true;
        } else {
            was_underscore = false;
        }
        result.push(mapped);
    }
    result
}

/// Escapes `text` for use inside `quote`-delimited identifiers by doubling
/// embedded quote characters.
#[must_use]
pub fn escape_identifier_with(text: &str, quote: char) -> String {
    let mut doubled = String::with_capacity(2);
    doubled.push(quote);
    doubled.push(quote);
    text.replace(quote, &doubled)
}

/// Escapes `text` and wraps it in `quote` characters. Empty input stays empty.
#[must_use]
pub fn escape_identifier_and_add_quotes_with(text: &str, quote: char) -> String {
    if text.is_empty() {
        return String::new();
    }
    format!("{quote}{}{quote}", escape_identifier_with(text, quote))
}

/// Escapes an identifier for standard double-quote quoting.
#[must_use]
pub fn escape_identifier(text: &str) -> String {
    escape_identifier_with(text, '"')
}

/// Escapes an identifier and wraps it in double quotes.
#[must_use]
pub fn escape_identifier_and_add_quotes(text: &str) -> String {
    escape_identifier_and_add_quotes_with(text, '"')
}
