//! Token extraction — scans raw document text for numeric-like substrings
//! and a currency hint.
//!
//! OCR output commonly glues short currency abbreviations to numbers with
//! inconsistent spacing ("Rs 100", "100Rs"), and misreads digits as the
//! look-alike letters `l`, `I`, `O`. The token pattern therefore accepts a
//! 1–3 letter affix around the digit run, and the digit run itself admits
//! the confusable letters so the normalizer can repair them later.

use regex::Regex;

use super::types::{Currency, TokenScan};

/// Minimum digit-run length for a usable token. Single characters are
/// unreliable at typical OCR error rates.
const MIN_TOKEN_LENGTH: usize = 2;

/// Scan document text for raw amount tokens and a currency hint.
///
/// Tokens are returned in document order, duplicates preserved. An empty
/// token list is a normal outcome for noisy or non-numeric documents, not
/// an error.
pub fn scan_tokens(text: &str) -> TokenScan {
    let searchable = strip_percent_amounts(text);

    // Three shapes: bare digit run, short alphabetic prefix + digits,
    // digits + short alphabetic suffix. The capture group isolates the
    // digit run so the affix never leaks into the token — important for
    // markers like "INR" whose letters overlap the confusable set.
    let token_pattern =
        Regex::new(r"(?:[A-Za-z]{1,3}\s*)?([0-9lIO]*[0-9][0-9lIO]*)(?:\s*[A-Za-z]{1,3})?")
            .unwrap();

    let raw_tokens: Vec<String> = token_pattern
        .captures_iter(&searchable)
        .map(|caps| caps[1].to_string())
        .filter(|token| token.chars().count() >= MIN_TOKEN_LENGTH)
        .collect();

    // Currency markers are searched in the ORIGINAL text: percent
    // stripping must not hide or shift a marker.
    let currency_hint = detect_currency(text);

    tracing::debug!(
        tokens = raw_tokens.len(),
        currency = ?currency_hint,
        "token scan complete"
    );

    TokenScan {
        raw_tokens,
        currency_hint,
    }
}

/// Remove percentage amounts ("20%", "2O %") before token search.
/// A percent figure is a rate, not a monetary amount, and must not be
/// captured as a bare number.
fn strip_percent_amounts(text: &str) -> String {
    let percent_pattern = Regex::new(r"[0-9lIO]+(?:[.,][0-9lIO]+)?\s*%").unwrap();
    percent_pattern.replace_all(text, "").into_owned()
}

/// Detect the document's currency from surface markers, case-insensitively.
/// The first marker encountered wins; absence yields no hint and the
/// caller falls back to a default currency.
fn detect_currency(text: &str) -> Option<Currency> {
    let marker_pattern = Regex::new(r"(?i)INR|Rs|\$|USD|EUR|GBP").unwrap();
    marker_pattern
        .find(text)
        .and_then(|m| Currency::from_marker(m.as_str()))
}
