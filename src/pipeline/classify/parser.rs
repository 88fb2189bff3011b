//! Parsing of raw oracle response text into classifications.
//!
//! The oracle's bytes are never trusted: optional markdown code fences
//! are stripped before structural parsing, and any response that does not
//! conform to the required shape fails the whole call — there is no
//! partial success.

use super::ClassifyError;
use crate::pipeline::types::ClassifiedAmount;

/// Strip an optional ```json … ``` (or bare ``` … ```) wrapper.
/// Unfenced text is returned trimmed and unchanged.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop an optional language tag on the fence line ("json").
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse oracle response text into the strict classification shape.
pub fn parse_classification_response(
    text: &str,
) -> Result<Vec<ClassifiedAmount>, ClassifyError> {
    let body = strip_code_fences(text);

    serde_json::from_str::<Vec<ClassifiedAmount>>(body)
        .map_err(|e| ClassifyError::JsonParsing(e.to_string()))
}
