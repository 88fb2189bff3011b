use serde::{Deserialize, Serialize};

use super::parser::parse_classification_response;
use super::prompt::{build_classification_prompt, response_schema, CLASSIFIER_SYSTEM_PROMPT};
use super::types::{ClassificationOracle, ClassificationRequest};
use super::ClassifyError;
use crate::config::OracleConfig;
use crate::pipeline::types::ClassifiedAmount;

/// Gemini HTTP oracle for amount classification.
///
/// Uses the structured-output generateContent endpoint: the request pins
/// a JSON response schema, and the response text is still fence-stripped
/// and shape-checked before use.
pub struct GeminiOracle {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiOracle {
    /// Create an oracle from configuration. An absent credential is
    /// carried as an empty key; the classifier short-circuits before any
    /// call can be issued with it.
    pub fn new(config: &OracleConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
            client,
            timeout_secs: config.timeout.as_secs(),
        }
    }

    fn endpoint(&self) -> String {
        // The key rides in the query string per the API contract; this
        // URL must never be logged.
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content<'a>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl ClassificationOracle for GeminiOracle {
    fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Vec<ClassifiedAmount>, ClassifyError> {
        let prompt = build_classification_prompt(request);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: CLASSIFIER_SYSTEM_PROMPT,
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ClassifyError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    ClassifyError::HttpClient(format!(
                        "request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    ClassifyError::HttpClient(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClassifyError::OracleStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| ClassifyError::MalformedResponse(e.without_url().to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                ClassifyError::MalformedResponse("response carries no candidate text".into())
            })?;

        parse_classification_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config_with_key() -> OracleConfig {
        OracleConfig {
            api_key: Some("test-key".into()),
            base_url: "https://example.invalid/v1beta/".into(),
            model: "gemini-test".into(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let oracle = GeminiOracle::new(&config_with_key());
        assert_eq!(oracle.base_url, "https://example.invalid/v1beta");
    }

    #[test]
    fn endpoint_embeds_model_and_key() {
        let oracle = GeminiOracle::new(&config_with_key());
        assert_eq!(
            oracle.endpoint(),
            "https://example.invalid/v1beta/models/gemini-test:generateContent?key=test-key"
        );
    }

    #[test]
    fn missing_credential_becomes_empty_key() {
        let mut config = config_with_key();
        config.api_key = None;
        let oracle = GeminiOracle::new(&config);
        assert!(oracle.endpoint().ends_with("key="));
    }

    #[test]
    fn request_body_matches_wire_format() {
        let schema = response_schema();
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "prompt" }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: CLASSIFIER_SYSTEM_PROMPT,
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            CLASSIFIER_SYSTEM_PROMPT
        );
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "ARRAY");
    }

    #[test]
    fn candidate_text_is_unwrapped_from_response_shape() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "[]"}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text = parsed.candidates[0]
            .content
            .as_ref()
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref());
        assert_eq!(text, Some("[]"));
    }

    #[test]
    fn empty_candidates_deserialize_cleanly() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
