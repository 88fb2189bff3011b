//! OCR boundary for image submissions.
//!
//! The pipeline itself is agnostic to text origin; image input only
//! enters through the [`OcrEngine`] trait. Without an engine wired in,
//! image submissions are rejected with a clear error — no placeholder
//! text is ever fabricated.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine not configured on this server")]
    NotConfigured,

    #[error("OCR initialization failed: {0}")]
    Init(String),

    #[error("OCR processing failed: {0}")]
    Processing(String),
}

/// OCR engine abstraction (allows mocking for tests).
pub trait OcrEngine: Send + Sync {
    /// Convert image bytes to plain text.
    fn image_to_text(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

/// Engine used when the server runs without OCR support: every image
/// submission fails with [`OcrError::NotConfigured`].
pub struct DisabledOcr;

impl OcrEngine for DisabledOcr {
    fn image_to_text(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Err(OcrError::NotConfigured)
    }
}

/// Bundled Tesseract OCR engine.
/// Only available when compiled with the `ocr` feature flag.
#[cfg(feature = "ocr")]
pub struct TesseractOcr {
    tessdata_dir: Option<std::path::PathBuf>,
    lang: String,
}

#[cfg(feature = "ocr")]
impl TesseractOcr {
    pub fn new(tessdata_dir: Option<std::path::PathBuf>) -> Self {
        Self {
            tessdata_dir,
            lang: "eng".to_string(),
        }
    }

    /// Set language(s) for OCR (e.g., "eng", "eng+fra").
    pub fn with_languages(mut self, langs: &str) -> Self {
        self.lang = langs.to_string();
        self
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for TesseractOcr {
    fn image_to_text(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        let tessdata = self
            .tessdata_dir
            .as_ref()
            .map(|dir| {
                dir.to_str()
                    .ok_or_else(|| OcrError::Init("invalid tessdata path".into()))
            })
            .transpose()?;

        let tess = tesseract::Tesseract::new(tessdata, Some(&self.lang))
            .map_err(|e| OcrError::Init(format!("{e:?}")))?;

        let mut tess = tess
            .set_image_from_mem(image_bytes)
            .map_err(|e| OcrError::Processing(format!("{e:?}")))?;

        tess.get_text()
            .map_err(|e| OcrError::Processing(format!("{e:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_engine_rejects_images() {
        let result = DisabledOcr.image_to_text(b"not really an image");
        assert!(matches!(result, Err(OcrError::NotConfigured)));
    }

    /// Mock engine returning fixed text.
    struct FixedTextOcr(&'static str);

    impl OcrEngine for FixedTextOcr {
        fn image_to_text(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn mock_engine_returns_configured_text() {
        let engine = FixedTextOcr("Total: Rs 1200");
        assert_eq!(engine.image_to_text(b"png").unwrap(), "Total: Rs 1200");
    }
}
