//! Amount detection orchestrator.
//!
//! Single entry point driving the full pipeline:
//! extract → normalize → classify → provenance.
//!
//! Each run is stateless and independent; every stage-local failure is
//! converted into a named terminal status before crossing the boundary —
//! callers always receive a structured result, never a raw error.

use uuid::Uuid;

use super::classify::{ClassifyError, ContextClassifier};
use super::extract::scan_tokens;
use super::normalize::normalize_tokens;
use super::provenance::locate_source;
use super::types::{Currency, PipelineResult, ProvenanceRecord};

/// Minimum usable document length after trimming, in characters.
/// Shorter inputs cannot plausibly carry an amount plus context.
pub const MIN_DOCUMENT_LENGTH: usize = 5;

/// Fallback currency when no marker is present in the document.
const FALLBACK_CURRENCY: Currency = Currency::Usd;

pub struct AmountDetector {
    classifier: ContextClassifier,
}

impl AmountDetector {
    pub fn new(classifier: ContextClassifier) -> Self {
        Self { classifier }
    }

    /// Run the full pipeline over one document.
    pub fn detect(&self, document_text: &str) -> PipelineResult {
        let request_id = Uuid::new_v4();
        let _span = tracing::info_span!("detect_amounts", request_id = %request_id).entered();

        let text = document_text.trim();
        if text.chars().count() < MIN_DOCUMENT_LENGTH {
            tracing::debug!(len = text.len(), "document below minimum length");
            return PipelineResult::no_amounts("document text too short or empty");
        }

        // Stage 1: token extraction
        let scan = scan_tokens(text);
        if scan.raw_tokens.is_empty() {
            return PipelineResult::no_amounts("document too noisy or no numeric tokens found");
        }

        // Stage 2: normalization (index-aligned, failures keep their slot)
        let normalized = normalize_tokens(&scan.raw_tokens);
        if normalized.iter().all(|t| t.value.is_none()) {
            return PipelineResult::no_amounts("tokens found but not valid numbers");
        }

        // Stage 3: context classification via the oracle
        let outcome = match self.classifier.classify(text, &normalized) {
            Ok(outcome) => outcome,
            Err(ClassifyError::CredentialMissing) => {
                tracing::error!("classification credential not configured");
                return PipelineResult::error("classification credential not configured");
            }
            Err(e) => {
                // Unexpected here — transient failures degrade inside the
                // classifier — but nothing may cross the boundary raw.
                tracing::error!(error = %e, "classification failed outside retry policy");
                return PipelineResult::error(e.to_string());
            }
        };

        if outcome.amounts.is_empty() {
            let mut result = PipelineResult::no_amounts("classification failed");
            result.model_confidence = outcome.confidence;
            return result;
        }

        // Stage 4: provenance resolution, total over all classified amounts
        let amounts = outcome
            .amounts
            .iter()
            .map(|a| ProvenanceRecord {
                kind: a.kind,
                value: a.value,
                source: locate_source(text, &a.raw_token),
            })
            .collect();

        let currency = scan.currency_hint.unwrap_or(FALLBACK_CURRENCY);
        tracing::info!(
            currency = %currency,
            amounts = outcome.amounts.len(),
            "detection complete"
        );

        PipelineResult::ok(currency, amounts, outcome.confidence, text)
    }
}
