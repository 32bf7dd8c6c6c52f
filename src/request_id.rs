use crate::router::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Tags each request with an id and a span naming the upstream it will hit,
/// logs how it ended and echoes the id back.
pub async fn inject_request_id(State(app_state): State<AppState>, mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));

    let config = app_state.llm_client.config();
    let span = info_span!(
        "http_request",
        trace_id = %id,
        method = %req.method(),
        path = %req.uri().path(),
        api_type = ?config.api_type,
        model = %config.model(),
    );

    let started = Instant::now();
    let mut resp = async move {
        let resp = next.run(req).await;
        info!(
            status = resp.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );
        resp
    }
    .instrument(span)
    .await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, val);
    }

    resp
}
