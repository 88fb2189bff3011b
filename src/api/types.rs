//! Shared types for the HTTP layer.

use std::sync::Arc;

use serde::Deserialize;

use crate::ocr::OcrEngine;
use crate::pipeline::AmountDetector;

/// Shared context for all routes: the pipeline plus the OCR boundary.
///
/// The detector is stateless across invocations, so a single instance
/// serves concurrent requests without any locking discipline.
#[derive(Clone)]
pub struct ApiContext {
    pub detector: Arc<AmountDetector>,
    pub ocr: Arc<dyn OcrEngine>,
}

impl ApiContext {
    pub fn new(detector: AmountDetector, ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            detector: Arc::new(detector),
            ocr,
        }
    }
}

/// JSON request body for `/detect-amounts`: direct text or a base64
/// image, mutually optional — at least one must be present.
#[derive(Debug, Default, Deserialize)]
pub struct DetectRequest {
    pub document_text: Option<String>,
    pub image_base64: Option<String>,
}
