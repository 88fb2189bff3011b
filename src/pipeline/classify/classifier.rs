//! Classification orchestration: credential gate, retry with exponential
//! backoff, and the confidence policy.

use std::time::Duration;

use super::types::{ClassificationOracle, ClassificationRequest};
use super::ClassifyError;
use crate::pipeline::types::{ClassifiedAmount, NormalizedToken};

/// Static confidence reported when the oracle answered in valid shape.
/// Signals "oracle responded well-formed", not a probabilistic score.
pub const ORACLE_SHAPE_CONFIDENCE: f32 = 0.90;

/// Retry policy for oracle calls.
#[derive(Debug, Clone)]
pub struct ClassifyPolicy {
    /// Total attempts, including the first.
    pub max_attempts: usize,
    /// Backoff base unit; the delay doubles per attempt (base, 2×base, …).
    pub backoff_base: Duration,
}

impl Default for ClassifyPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl ClassifyPolicy {
    /// A policy with no backoff delay, for tests.
    pub fn immediate() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::ZERO,
        }
    }
}

/// Outcome of the classification stage. Oracle exhaustion is a benign
/// outcome (empty amounts, zero confidence), never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOutcome {
    pub amounts: Vec<ClassifiedAmount>,
    pub confidence: f32,
}

/// Context classifier: pairs tokens with values, delegates labeling to
/// the injected oracle, and applies the retry and confidence policies.
pub struct ContextClassifier {
    oracle: Box<dyn ClassificationOracle + Send + Sync>,
    credential: Option<String>,
    policy: ClassifyPolicy,
}

impl ContextClassifier {
    /// The credential is an explicit constructor argument rather than
    /// ambient process state, so the missing-credential path is
    /// deterministic under test.
    pub fn new(
        oracle: Box<dyn ClassificationOracle + Send + Sync>,
        credential: Option<String>,
        policy: ClassifyPolicy,
    ) -> Self {
        Self {
            oracle,
            credential,
            policy,
        }
    }

    /// Classify the normalized amounts against the document context.
    ///
    /// `Err` is reserved for the missing-credential condition, which is
    /// a server-side configuration failure; transient oracle failures are
    /// retried and, once exhausted, degrade to an empty outcome with
    /// confidence 0.0.
    pub fn classify(
        &self,
        document_text: &str,
        tokens: &[NormalizedToken],
    ) -> Result<ClassificationOutcome, ClassifyError> {
        if self.credential.is_none() {
            // Short-circuit: no network attempt without a credential.
            return Err(ClassifyError::CredentialMissing);
        }

        let request = ClassificationRequest::new(document_text, tokens);
        let mut last_error: Option<ClassifyError> = None;

        for attempt in 1..=self.policy.max_attempts {
            match self.oracle.classify(&request) {
                Ok(amounts) => {
                    tracing::debug!(attempt, classified = amounts.len(), "oracle call succeeded");
                    return Ok(ClassificationOutcome {
                        amounts,
                        confidence: ORACLE_SHAPE_CONFIDENCE,
                    });
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "oracle call failed");
                    last_error = Some(e);
                    if attempt < self.policy.max_attempts {
                        // Delay doubles per attempt: base, 2×base, 4×base…
                        let delay = self.policy.backoff_base * (1u32 << (attempt - 1));
                        std::thread::sleep(delay);
                    }
                }
            }
        }

        tracing::warn!(
            attempts = self.policy.max_attempts,
            error = %last_error
                .unwrap_or_else(|| ClassifyError::HttpClient("no attempt made".into())),
            "classification retries exhausted"
        );

        Ok(ClassificationOutcome {
            amounts: Vec::new(),
            confidence: 0.0,
        })
    }
}
