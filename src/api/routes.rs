//! Detection endpoint — text and image submissions.
//!
//! `POST /detect-amounts` accepts three submission forms:
//! 1. JSON `{"document_text": …}` — raw text
//! 2. JSON `{"image_base64": …}` — base64 image, converted via OCR
//! 3. multipart form-data with a `file` field — uploaded image, via OCR
//!
//! All benign pipeline outcomes are 200s with a structured body; only
//! malformed requests (400) and server configuration failures (500)
//! surface as HTTP errors.

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use tower_http::cors::CorsLayer;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DetectRequest};
use crate::ocr::OcrError;
use crate::pipeline::types::{PipelineResult, PipelineStatus};

/// Maximum accepted image payload (8 MB decoded).
const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Build the detection router.
pub fn detection_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/detect-amounts", post(detect))
        .route("/health", get(health))
        .with_state(ctx)
        .layer(CorsLayer::permissive())
}

/// `GET /health` — liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": crate::config::APP_NAME,
        "version": crate::config::APP_VERSION,
    }))
}

/// `POST /detect-amounts` — run the full detection pipeline on one
/// document, whatever its submission form.
async fn detect(
    State(ctx): State<ApiContext>,
    req: Request,
) -> Result<Json<PipelineResult>, ApiError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let document_text = if content_type.starts_with("application/json") {
        resolve_json_submission(&ctx, req).await?
    } else if content_type.starts_with("multipart/form-data") {
        resolve_multipart_submission(&ctx, req).await?
    } else {
        return Err(ApiError::BadRequest(
            "expected application/json or multipart/form-data".into(),
        ));
    };

    // The pipeline is synchronous by design (the oracle retry loop
    // blocks between attempts), so it runs on a blocking worker.
    let detector = ctx.detector.clone();
    let result = tokio::task::spawn_blocking(move || detector.detect(&document_text))
        .await
        .map_err(|e| ApiError::Internal(format!("pipeline task failed: {e}")))?;

    if result.status == PipelineStatus::Error {
        let reason = result
            .reason
            .unwrap_or_else(|| "unknown configuration failure".into());
        return Err(ApiError::Config(reason));
    }

    Ok(Json(result))
}

/// JSON body: direct text, or a base64 image routed through OCR.
async fn resolve_json_submission(ctx: &ApiContext, req: Request) -> Result<String, ApiError> {
    let Json(payload) = Json::<DetectRequest>::from_request(req, &())
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed JSON body: {e}")))?;

    if let Some(encoded) = payload.image_base64 {
        let image_bytes = decode_image_base64(&encoded)?;
        return ocr_to_text(ctx, image_bytes).await;
    }

    payload
        .document_text
        .ok_or_else(|| ApiError::BadRequest("No valid document_text or image provided".into()))
}

/// Multipart body: the `file` field holds an image for OCR.
async fn resolve_multipart_submission(
    ctx: &ApiContext,
    req: Request,
) -> Result<String, ApiError> {
    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("File upload failed: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("File upload failed: {e}")))?;
            if bytes.len() > MAX_IMAGE_BYTES {
                return Err(ApiError::BadRequest(format!(
                    "Image exceeds {} byte limit",
                    MAX_IMAGE_BYTES
                )));
            }
            return ocr_to_text(ctx, bytes.to_vec()).await;
        }
    }

    Err(ApiError::BadRequest(
        "multipart form is missing a 'file' field".into(),
    ))
}

/// Decode a base64 image, accepting both bare payloads and data URLs
/// (`data:image/png;base64,…`).
fn decode_image_base64(encoded: &str) -> Result<Vec<u8>, ApiError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| ApiError::BadRequest(format!("Image decode failed: {e}")))?;

    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::BadRequest(format!(
            "Image exceeds {} byte limit",
            MAX_IMAGE_BYTES
        )));
    }
    Ok(bytes)
}

/// Run the OCR engine on a blocking worker and surface its text.
async fn ocr_to_text(ctx: &ApiContext, image_bytes: Vec<u8>) -> Result<String, ApiError> {
    let ocr = ctx.ocr.clone();
    let text = tokio::task::spawn_blocking(move || ocr.image_to_text(&image_bytes))
        .await
        .map_err(|e| ApiError::Internal(format!("OCR task failed: {e}")))?
        .map_err(|e| match e {
            OcrError::NotConfigured => ApiError::Config(e.to_string()),
            other => ApiError::BadRequest(format!("Image conversion failed: {other}")),
        })?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::ocr::{DisabledOcr, OcrEngine};
    use crate::pipeline::classify::{ClassifyPolicy, ContextClassifier, MockOracle};
    use crate::pipeline::types::{AmountKind, ClassifiedAmount};
    use crate::pipeline::AmountDetector;

    struct FixedTextOcr(&'static str);

    impl OcrEngine for FixedTextOcr {
        fn image_to_text(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    fn classification() -> Vec<ClassifiedAmount> {
        vec![ClassifiedAmount {
            kind: AmountKind::TotalBill,
            value: 1200.0,
            raw_token: "1200".into(),
        }]
    }

    fn router_with(
        oracle: MockOracle,
        credential: Option<&str>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Router {
        let classifier = ContextClassifier::new(
            Box::new(oracle),
            credential.map(String::from),
            ClassifyPolicy::immediate(),
        );
        detection_router(ApiContext::new(AmountDetector::new(classifier), ocr))
    }

    fn json_request(body: &str) -> http::Request<Body> {
        http::Request::builder()
            .method("POST")
            .uri("/detect-amounts")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn text_submission_returns_classified_amounts() {
        let router = router_with(
            MockOracle::always(classification()),
            Some("key"),
            Arc::new(DisabledOcr),
        );
        let response = router
            .oneshot(json_request(r#"{"document_text":"Total Amount: Rs 1200"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["currency"], "RS");
        assert_eq!(json["amounts"][0]["type"], "total_bill");
        assert_eq!(json["amounts"][0]["value"], 1200.0);
    }

    #[tokio::test]
    async fn short_text_is_a_benign_200() {
        let router = router_with(
            MockOracle::always(classification()),
            Some("key"),
            Arc::new(DisabledOcr),
        );
        let response = router
            .oneshot(json_request(r#"{"document_text":"Hi!"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "no_amounts_found");
    }

    #[tokio::test]
    async fn missing_text_and_image_is_400() {
        let router = router_with(
            MockOracle::always(classification()),
            Some("key"),
            Arc::new(DisabledOcr),
        );
        let response = router.oneshot(json_request("{}")).await.unwrap();

        assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn missing_credential_is_500_with_structured_body() {
        let router = router_with(
            MockOracle::always(classification()),
            None,
            Arc::new(DisabledOcr),
        );
        let response = router
            .oneshot(json_request(r#"{"document_text":"Total Amount: Rs 1200"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert!(json["reason"]
            .as_str()
            .unwrap()
            .contains("credential not configured"));
    }

    #[tokio::test]
    async fn image_submission_goes_through_ocr() {
        let router = router_with(
            MockOracle::always(classification()),
            Some("key"),
            Arc::new(FixedTextOcr("Total Amount: Rs 1200")),
        );
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"fake-image");
        let body = format!(r#"{{"image_base64":"{encoded}"}}"#);
        let response = router.oneshot(json_request(&body)).await.unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["raw_text"], "Total Amount: Rs 1200");
    }

    #[tokio::test]
    async fn image_without_ocr_engine_is_rejected() {
        let router = router_with(
            MockOracle::always(classification()),
            Some("key"),
            Arc::new(DisabledOcr),
        );
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"fake-image");
        let body = format!(r#"{{"image_base64":"{encoded}"}}"#);
        let response = router.oneshot(json_request(&body)).await.unwrap();

        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["reason"].as_str().unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn invalid_base64_is_400() {
        let router = router_with(
            MockOracle::always(classification()),
            Some("key"),
            Arc::new(FixedTextOcr("ignored")),
        );
        let response = router
            .oneshot(json_request(r#"{"image_base64":"%%% not base64 %%%"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oracle_exhaustion_is_a_benign_200() {
        let router = router_with(
            MockOracle::always_failing(),
            Some("key"),
            Arc::new(DisabledOcr),
        );
        let response = router
            .oneshot(json_request(r#"{"document_text":"Total Amount: Rs 1200"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "no_amounts_found");
        assert_eq!(json["model_confidence"], 0.0);
    }

    #[tokio::test]
    async fn unsupported_content_type_is_400() {
        let router = router_with(
            MockOracle::always(classification()),
            Some("key"),
            Arc::new(DisabledOcr),
        );
        let request = http::Request::builder()
            .method("POST")
            .uri("/detect-amounts")
            .header("content-type", "text/plain")
            .body(Body::from("Total 1200"))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
    }
}
