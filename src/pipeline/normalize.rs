//! Numeric normalization — repairs common OCR character confusions and
//! converts raw tokens to integers.
//!
//! The substitutions are fixed and position-independent: `l` and `I`
//! become `1`, `O` becomes `0`. No context-sensitive disambiguation is
//! attempted; a token that still fails to parse keeps its slot with no
//! value rather than being dropped from the sequence.

use super::types::NormalizedToken;

/// Repair OCR digit confusions in a single token.
pub fn repair_confusions(token: &str) -> String {
    token
        .chars()
        .map(|c| match c {
            'l' | 'I' => '1',
            'O' => '0',
            other => other,
        })
        .collect()
}

/// Normalize an ordered token list to integer amounts.
///
/// The output has exactly one entry per input token, in the same order:
/// alignment between raw tokens and normalized values holds by
/// construction, so downstream pairing can never slip an index when some
/// tokens fail to convert.
pub fn normalize_tokens(raw_tokens: &[String]) -> Vec<NormalizedToken> {
    raw_tokens
        .iter()
        .map(|raw| {
            let repaired = repair_confusions(raw);
            let value = repaired.parse::<i64>().ok();
            if value.is_none() {
                tracing::debug!(token = %raw, "token did not normalize to an integer");
            }
            NormalizedToken {
                raw: raw.clone(),
                value,
            }
        })
        .collect()
}
