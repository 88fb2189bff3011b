//! Context-aware semantic classification of extracted amounts.
//!
//! The classification oracle is an injected capability behind the
//! [`ClassificationOracle`] trait: the retry/backoff policy and the
//! missing-credential short-circuit are testable against a mock with no
//! network access.

pub mod classifier;
pub mod gemini;
pub mod parser;
pub mod prompt;
pub mod types;

pub use classifier::*;
pub use gemini::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("classification credential not configured")]
    CredentialMissing,

    #[error("oracle endpoint unreachable: {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("oracle returned error (status {status}): {body}")]
    OracleStatus { status: u16, body: String },

    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),
}
