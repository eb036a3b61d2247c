//! Byte-level primitives shared by the workbench engine: command-line
//! lexing, offset token parsing, and the wildcard byte pattern with its
//! first-hit matcher.
//!
//! Everything here is pure and allocation-light; no file or state access.
//! Higher layers own clamping against file size. `parse_offset` does not
//! bound-check, so the same token grammar serves every verb: a `goto`
//! clamps, a `dump` clips the range, and a `patch` rejects overruns.

use thiserror::Error;

pub mod pattern;
pub mod scan;

pub use pattern::{Pattern, Tok};
pub use scan::find;

/// Offset token failures. Carried up to the dispatch boundary where they
/// become a status line rather than a hard error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("bad offset {0:?}")]
    BadOffset(String),
}

/// Split a line on Unicode whitespace, dropping empty segments.
pub fn split_ws(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Byte index where the `token_index`-th whitespace-separated token starts
/// in `line`, or `None` if the line has fewer tokens.
///
/// Used for "rest of line" arguments: slicing the original line from this
/// index preserves embedded whitespace (bookmark labels) and the casing of
/// hex digits exactly as the user typed them.
pub fn token_start(line: &str, token_index: usize) -> Option<usize> {
    let mut seen = 0usize;
    let mut in_token = false;
    for (idx, ch) in line.char_indices() {
        if ch.is_whitespace() {
            in_token = false;
        } else if !in_token {
            if seen == token_index {
                return Some(idx);
            }
            seen += 1;
            in_token = true;
        }
    }
    None
}

/// Slice of `line` from the start of its `token_index`-th token to the end.
pub fn rest_of_line(line: &str, token_index: usize) -> Option<&str> {
    token_start(line, token_index).map(|idx| &line[idx..])
}

/// Parse an offset token.
///
/// Grammar: a leading `+` or `-` makes the token relative to `page_offset`
/// (a negative result clamps to 0); otherwise it is absolute. The numeric
/// part is decimal, or hex with a `0x`/`0X` prefix. Empty tokens and
/// out-of-range literals fail with [`ParseError::BadOffset`].
pub fn parse_offset(token: &str, page_offset: usize) -> Result<usize, ParseError> {
    let t = token.trim();
    let bad = || ParseError::BadOffset(t.to_string());
    if t.is_empty() {
        return Err(bad());
    }
    if let Some(rest) = t.strip_prefix('+') {
        let delta = parse_unsigned(rest).ok_or_else(bad)?;
        page_offset.checked_add(delta).ok_or_else(bad)
    } else if let Some(rest) = t.strip_prefix('-') {
        let delta = parse_unsigned(rest).ok_or_else(bad)?;
        Ok(page_offset.saturating_sub(delta))
    } else {
        parse_unsigned(t).ok_or_else(bad)
    }
}

/// Parse an unsigned numeric literal, decimal or `0x`-prefixed hex.
pub fn parse_unsigned(token: &str) -> Option<usize> {
    let t = token.trim();
    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else {
        t.parse::<usize>().ok()
    }
}
