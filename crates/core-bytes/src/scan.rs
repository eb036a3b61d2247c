//! First-hit pattern scan over a byte slice.
//!
//! A straight forward scan: expected file sizes are modest and the
//! contract is purely positional (first index at or after `start` where
//! every token matches). Wildcards make the classic skip-table tricks
//! marginal, so none are attempted.

use crate::pattern::Pattern;

/// Find the first offset `i >= start` at which `pattern` matches
/// `haystack`, or `None`. The empty pattern and a `start` at or past the
/// end of the haystack never match. Page boundaries are invisible here.
pub fn find(haystack: &[u8], pattern: &Pattern, start: usize) -> Option<usize> {
    let n = haystack.len();
    let m = pattern.len();
    if m == 0 || start >= n || m > n {
        return None;
    }
    (start..=n - m).find(|&i| matches_at(haystack, pattern, i))
}

fn matches_at(haystack: &[u8], pattern: &Pattern, at: usize) -> bool {
    pattern
        .tokens()
        .iter()
        .zip(&haystack[at..])
        .all(|(tok, &b)| tok.matches(b))
}
