use crate::analysis::Analysis;
use crate::auth;
use crate::data_url::DataUrl;
use crate::error::AnalyzeError;
use crate::llm_client::LlmClient;
use crate::request_id::{RequestId, inject_request_id};
use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::{Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
};
use bytes::Bytes;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct AppState {
    pub llm_client: Arc<LlmClient>,
    pub token: Option<String>,
}

pub fn build_router(app_state: AppState) -> Router {
    let body_limit = app_state.llm_client.config().max_body_bytes();
    Router::new()
        .route("/", any(analyze_waste).layer(DefaultBodyLimit::max(body_limit)))
        .route("/api/analyze", any(analyze_waste).layer(DefaultBodyLimit::max(body_limit)))
        .route("/health", get(|| async { "OK" }))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_authorization,
        ))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(app_state.clone(), inject_request_id))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    };
    error!("Error in analyze handler: {}", detail);
    AnalyzeError::Unexpected.into_response()
}

#[axum_macros::debug_handler]
pub async fn analyze_waste(
    State(app_state): State<AppState>,
    method: Method,
    request_id: Option<Extension<RequestId>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    // The method decides the answer even when the body could not be buffered.
    if method != Method::POST {
        info!("Rejected {} request", method);
        return AnalyzeError::UnsupportedMethod.into_response();
    }

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let limit = app_state.llm_client.config().max_body_bytes();
            let e = body_rejection(rejection, limit);
            warn!("Rejected request ({}): {}", e.kind(), e);
            return e.into_response();
        }
    };

    let request_id = request_id.map(|Extension(id)| id);
    match classify(&app_state, &body, request_id.as_ref()).await {
        Ok(analysis) => {
            info!("Classified image as {:?}", analysis.classification);
            Json(analysis).into_response()
        }
        Err(e) => {
            if e.is_client_error() {
                warn!("Rejected request ({}): {}", e.kind(), e);
            } else {
                error!("Failed to analyze image ({}): {}", e.kind(), e);
            }
            e.into_response()
        }
    }
}

fn body_rejection(rejection: BytesRejection, limit: usize) -> AnalyzeError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AnalyzeError::InvalidImageFormat(format!("image data exceeds the {} byte request limit", limit))
    } else {
        AnalyzeError::InvalidJson(rejection.body_text())
    }
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` all count as no image.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// decode → call → parse, without the HTTP wrapping.
pub async fn classify(
    app_state: &AppState,
    body: &[u8],
    request_id: Option<&RequestId>,
) -> Result<Analysis, AnalyzeError> {
    let payload: Value = serde_json::from_slice(body).map_err(|e| AnalyzeError::InvalidJson(e.to_string()))?;

    let image_data = match payload.get("image_data") {
        None => return Err(AnalyzeError::MissingImage),
        Some(v) if is_blank(v) => return Err(AnalyzeError::MissingImage),
        Some(Value::String(s)) => s,
        Some(_) => {
            return Err(AnalyzeError::InvalidImageFormat("image_data must be a string".to_string()));
        }
    };

    let image = DataUrl::parse(image_data)?;
    debug!("Received {} image, {} base64 chars", image.mime_type, image.payload.len());

    let answer = app_state.llm_client.analyze(&image, request_id).await?;
    let analysis = Analysis::from_answer(&answer);

    let taxonomy = app_state.llm_client.config().taxonomy();
    if !taxonomy.recognizes(&analysis.classification) {
        warn!(
            "Model answer {:?} does not name a {:?} category, relaying as-is",
            analysis.classification, taxonomy
        );
    }
    Ok(analysis)
}
