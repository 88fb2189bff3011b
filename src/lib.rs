//! Tallylens — monetary amount detection for noisy financial documents.
//!
//! Receipts, bills and claim summaries arrive as OCR text riddled with
//! digit confusions (`l`/`I` for `1`, `O` for `0`). The pipeline scans
//! that text for monetary tokens, repairs the confusions, asks an
//! external classification oracle what role each amount plays
//! (total, paid, due, …) and ties every classified amount back to the
//! snippet of source text it came from.
//!
//! The crate splits along two seams:
//! - [`pipeline`] — the pure detection pipeline, oracle injected via
//!   the [`pipeline::ClassificationOracle`] trait
//! - [`api`] — the axum HTTP surface exposing `POST /detect-amounts`

pub mod api;
pub mod config;
pub mod ocr;
pub mod pipeline;

pub use pipeline::{AmountDetector, PipelineResult, PipelineStatus};
