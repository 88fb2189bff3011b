//! The amount detection pipeline: extraction → normalization →
//! classification → provenance. Strictly forward data flow, no state
//! held across invocations.

pub mod classify;
pub mod extract;
pub mod normalize;
pub mod processor;
pub mod provenance;
pub mod types;

pub use classify::{
    ClassificationOracle, ClassificationOutcome, ClassifyError, ClassifyPolicy,
    ContextClassifier, GeminiOracle, MockOracle,
};
pub use extract::scan_tokens;
pub use normalize::{normalize_tokens, repair_confusions};
pub use processor::{AmountDetector, MIN_DOCUMENT_LENGTH};
pub use provenance::locate_source;
pub use types::*;
