//! Provenance resolution — locates the textual evidence for a classified
//! amount in the original document.
//!
//! Resolution is total: when the raw token cannot be found in the text,
//! the record degrades to a token-only citation instead of failing.

use regex::Regex;

/// Context window on each side of the token, in characters.
const CONTEXT_WINDOW: usize = 20;

/// Locate a short excerpt of `text` around `raw_token`.
///
/// Returns `text: '…'` with the trimmed excerpt on a case-insensitive
/// match, or `token: '…'` when the token does not appear in the text.
pub fn locate_source(text: &str, raw_token: &str) -> String {
    let escaped = regex::escape(raw_token);
    let pattern = format!("(?i)(.{{0,{CONTEXT_WINDOW}}}?{escaped}.{{0,{CONTEXT_WINDOW}}}?)");

    // The pattern is built from an escaped literal; compilation only
    // fails on pathological window sizes, and falls back to the bare token.
    if let Ok(re) = Regex::new(&pattern) {
        if let Some(caps) = re.captures(text) {
            return format!("text: '{}'", caps[1].trim());
        }
    }

    format!("token: '{raw_token}'")
}
