use crate::error::ErrorResponse;
use crate::router::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, info};

fn unauthorized(message: &str, kind: &str) -> Response {
    let error_response = ErrorResponse {
        error: message.to_string(),
        kind: kind.to_string(),
    };
    (StatusCode::UNAUTHORIZED, Json(error_response)).into_response()
}

/// Bearer-token gate, only active when the server was started with `--token`.
pub async fn require_authorization(
    State(app_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let Some(expected) = app_state.token.as_deref() else {
        return Ok(next.run(request).await);
    };
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let provided = request
        .headers()
        .get("Authorization")
        .and_then(|hv| hv.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(|t| t.trim()))
        .or_else(|| request.headers().get("x-api-key").and_then(|hv| hv.to_str().ok()));

    match provided {
        None => {
            info!("Missing Authorization header");
            Err(unauthorized("Authorization header is required", "MissingAuthHeader"))
        }
        Some(token) if token != expected => {
            info!("Invalid token provided");
            Err(unauthorized("Invalid authentication token", "InvalidToken"))
        }
        Some(_) => {
            debug!("Token validation successful");
            Ok(next.run(request).await)
        }
    }
}
