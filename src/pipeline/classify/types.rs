use serde::Serialize;

use super::ClassifyError;
use crate::pipeline::types::{ClassifiedAmount, NormalizedToken};

/// One raw token paired with its normalized integer value, as presented
/// to the oracle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountMapping {
    pub raw_token: String,
    pub value: i64,
}

/// Structured request for one classification call: the full document text
/// plus the detected amount mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRequest {
    pub document_text: String,
    pub amounts: Vec<AmountMapping>,
}

impl ClassificationRequest {
    /// Build a request by pairing raw tokens with their normalized
    /// values. Tokens that failed normalization carry no value and are
    /// not presented to the oracle; alignment is positional by
    /// construction of [`NormalizedToken`].
    pub fn new(document_text: &str, tokens: &[NormalizedToken]) -> Self {
        let amounts = tokens
            .iter()
            .filter_map(|t| {
                t.value.map(|value| AmountMapping {
                    raw_token: t.raw.clone(),
                    value,
                })
            })
            .collect();

        Self {
            document_text: document_text.to_string(),
            amounts,
        }
    }
}

/// Classification oracle abstraction (allows mocking).
///
/// A single call either returns a well-formed ordered classification list
/// or fails as a whole; the oracle is assumed latent, unreliable, and
/// occasionally non-conformant to schema.
pub trait ClassificationOracle {
    fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Vec<ClassifiedAmount>, ClassifyError>;
}

/// Mock oracle for testing — replays scripted outcomes and records how
/// many calls were made.
pub struct MockOracle {
    outcomes: std::sync::Mutex<Vec<Result<Vec<ClassifiedAmount>, ClassifyError>>>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockOracle {
    /// An oracle that answers every call with the same classification list.
    pub fn always(amounts: Vec<ClassifiedAmount>) -> Self {
        Self {
            outcomes: std::sync::Mutex::new(vec![Ok(amounts)]),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// An oracle that fails every call with an unreachable-endpoint error.
    pub fn always_failing() -> Self {
        Self {
            outcomes: std::sync::Mutex::new(vec![]),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// An oracle that replays `outcomes` in order, then repeats the last
    /// one (or fails, if the script is empty).
    pub fn scripted(outcomes: Vec<Result<Vec<ClassifiedAmount>, ClassifyError>>) -> Self {
        Self {
            outcomes: std::sync::Mutex::new(outcomes),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Number of classify calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl ClassificationOracle for MockOracle {
    fn classify(
        &self,
        _request: &ClassificationRequest,
    ) -> Result<Vec<ClassifiedAmount>, ClassifyError> {
        let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let outcomes = self.outcomes.lock().unwrap();

        match outcomes.get(call).or_else(|| outcomes.last()) {
            Some(Ok(amounts)) => Ok(amounts.clone()),
            Some(Err(e)) => Err(clone_error(e)),
            None => Err(ClassifyError::Connection("mock oracle offline".into())),
        }
    }
}

fn clone_error(e: &ClassifyError) -> ClassifyError {
    match e {
        ClassifyError::CredentialMissing => ClassifyError::CredentialMissing,
        ClassifyError::Connection(s) => ClassifyError::Connection(s.clone()),
        ClassifyError::HttpClient(s) => ClassifyError::HttpClient(s.clone()),
        ClassifyError::OracleStatus { status, body } => ClassifyError::OracleStatus {
            status: *status,
            body: body.clone(),
        },
        ClassifyError::MalformedResponse(s) => ClassifyError::MalformedResponse(s.clone()),
        ClassifyError::JsonParsing(s) => ClassifyError::JsonParsing(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::AmountKind;

    fn token(raw: &str, value: Option<i64>) -> NormalizedToken {
        NormalizedToken {
            raw: raw.to_string(),
            value,
        }
    }

    #[test]
    fn request_pairs_only_normalized_values() {
        let tokens = vec![
            token("1200", Some(1200)),
            token("1o0", None),
            token("2OO", Some(200)),
        ];
        let request = ClassificationRequest::new("some text", &tokens);

        assert_eq!(
            request.amounts,
            vec![
                AmountMapping {
                    raw_token: "1200".into(),
                    value: 1200
                },
                AmountMapping {
                    raw_token: "2OO".into(),
                    value: 200
                },
            ]
        );
    }

    #[test]
    fn request_with_no_values_has_empty_mapping() {
        let tokens = vec![token("1o0", None)];
        let request = ClassificationRequest::new("text", &tokens);
        assert!(request.amounts.is_empty());
    }

    #[test]
    fn mock_replays_script_then_repeats_last() {
        let classified = vec![ClassifiedAmount {
            kind: AmountKind::Paid,
            value: 100.0,
            raw_token: "100".into(),
        }];
        let oracle = MockOracle::scripted(vec![
            Err(ClassifyError::Connection("down".into())),
            Ok(classified.clone()),
        ]);
        let request = ClassificationRequest::new("t", &[]);

        assert!(oracle.classify(&request).is_err());
        assert_eq!(oracle.classify(&request).unwrap(), classified);
        assert_eq!(oracle.classify(&request).unwrap(), classified);
        assert_eq!(oracle.call_count(), 3);
    }

    #[test]
    fn always_failing_mock_never_succeeds() {
        let oracle = MockOracle::always_failing();
        let request = ClassificationRequest::new("t", &[]);
        assert!(oracle.classify(&request).is_err());
        assert!(oracle.classify(&request).is_err());
        assert_eq!(oracle.call_count(), 2);
    }
}
