use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tallylens::api::{self, ApiContext};
use tallylens::config::{self, OracleConfig};
use tallylens::pipeline::classify::{ClassifyPolicy, ContextClassifier, GeminiOracle};
use tallylens::pipeline::AmountDetector;

fn main() -> Result<(), std::io::Error> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let oracle_config = OracleConfig::from_env();
    if oracle_config.api_key.is_none() {
        tracing::warn!(
            "GEMINI_API_KEY not set; detection requests will fail until it is configured"
        );
    }

    // The blocking HTTP client must be built outside the async runtime.
    let credential = oracle_config.api_key.clone();
    let oracle = GeminiOracle::new(&oracle_config);
    let classifier =
        ContextClassifier::new(Box::new(oracle), credential, ClassifyPolicy::default());
    let detector = AmountDetector::new(classifier);

    let ocr = ocr_engine();
    let ctx = ApiContext::new(detector, ocr);

    let bind = config::bind_addr();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(api::serve(ctx, &bind))
}

#[cfg(feature = "ocr")]
fn ocr_engine() -> Arc<dyn tallylens::ocr::OcrEngine> {
    let tessdata = std::env::var("TESSDATA_PREFIX")
        .ok()
        .map(std::path::PathBuf::from);
    Arc::new(tallylens::ocr::TesseractOcr::new(tessdata))
}

#[cfg(not(feature = "ocr"))]
fn ocr_engine() -> Arc<dyn tallylens::ocr::OcrEngine> {
    tracing::info!("OCR support not compiled in; image submissions will be rejected");
    Arc::new(tallylens::ocr::DisabledOcr)
}
