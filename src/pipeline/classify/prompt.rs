use super::types::ClassificationRequest;

pub const CLASSIFIER_SYSTEM_PROMPT: &str = "You are a financial document classifier.";

/// The seven categories the oracle must choose from, in wire form.
pub const AMOUNT_CATEGORIES: &[&str] = &[
    "total_bill",
    "paid",
    "due",
    "tax",
    "discount",
    "item_cost",
    "other_fee",
];

/// Build the classification prompt: the full document text, the detected
/// amount mapping, and the instruction pinning the output categories.
pub fn build_classification_prompt(request: &ClassificationRequest) -> String {
    // The mapping serializes infallibly: plain strings and integers.
    let mapping_json =
        serde_json::to_string(&request.amounts).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Analyze the following document text:
---
{document}
---
The detected and normalized amounts are: {mapping}.
Classify each amount as: {categories}.
Respond with a JSON array of objects, each with "type", "value" and "raw_token"."#,
        document = request.document_text,
        mapping = mapping_json,
        categories = AMOUNT_CATEGORIES.join(", "),
    )
}

/// Structured response schema sent alongside the prompt. The oracle is
/// asked to conform, but the response is still parsed defensively.
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "type": { "type": "STRING" },
                "value": { "type": "NUMBER" },
                "raw_token": { "type": "STRING" }
            },
            "required": ["type", "value", "raw_token"]
        }
    })
}
