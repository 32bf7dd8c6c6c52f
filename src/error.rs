use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const INVALID_METHOD_MESSAGE: &str = "Invalid request method. Only POST is allowed.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected server error occurred.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// Every way a classification request can fail. None of them are retried.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Invalid JSON data: {0}")]
    InvalidJson(String),

    #[error("Missing image data")]
    MissingImage,

    #[error("Invalid image data format: {0}")]
    InvalidImageFormat(String),

    #[error("{0} environment variable is not set")]
    MissingCredential(String),

    #[error("Error analyzing image: {0}")]
    UpstreamCallFailure(String),

    #[error("{}", UNEXPECTED_ERROR_MESSAGE)]
    Unexpected,

    #[error("{}", INVALID_METHOD_MESSAGE)]
    UnsupportedMethod,
}

impl AnalyzeError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzeError::InvalidJson(_) => "InvalidJSON",
            AnalyzeError::MissingImage => "MissingImage",
            AnalyzeError::InvalidImageFormat(_) => "InvalidImageFormat",
            AnalyzeError::MissingCredential(_) => "MissingCredential",
            AnalyzeError::UpstreamCallFailure(_) => "UpstreamCallFailure",
            AnalyzeError::Unexpected => "UnexpectedError",
            AnalyzeError::UnsupportedMethod => "UnsupportedMethod",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AnalyzeError::InvalidJson(_)
            | AnalyzeError::MissingImage
            | AnalyzeError::InvalidImageFormat(_)
            | AnalyzeError::UnsupportedMethod => StatusCode::BAD_REQUEST,
            AnalyzeError::MissingCredential(_)
            | AnalyzeError::UpstreamCallFailure(_)
            | AnalyzeError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl From<reqwest::Error> for AnalyzeError {
    fn from(e: reqwest::Error) -> Self {
        // The gemini URL carries the api key as a query parameter.
        AnalyzeError::UpstreamCallFailure(e.without_url().to_string())
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Method errors stay plain text, like the page the handler was written for expects.
        if let AnalyzeError::UnsupportedMethod = self {
            return (status, INVALID_METHOD_MESSAGE).into_response();
        }
        let error_response = ErrorResponse {
            error: self.to_string(),
            kind: self.kind().to_string(),
        };
        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn body_string(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_client_and_server_statuses() {
        assert_eq!(AnalyzeError::MissingImage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AnalyzeError::InvalidJson("eof".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AnalyzeError::UnsupportedMethod.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AnalyzeError::MissingCredential("GITHUB_PAT".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AnalyzeError::Unexpected.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(AnalyzeError::InvalidImageFormat("x".into()).is_client_error());
        assert!(!AnalyzeError::UpstreamCallFailure("x".into()).is_client_error());
    }

    #[tokio::test]
    async fn test_upstream_failure_body_wraps_message() {
        let resp = AnalyzeError::UpstreamCallFailure("rate limited".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let v: Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(v["error"], "Error analyzing image: rate limited");
        assert_eq!(v["kind"], "UpstreamCallFailure");
    }

    #[tokio::test]
    async fn test_unexpected_error_is_generic() {
        let resp = AnalyzeError::Unexpected.into_response();
        let v: Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(v["error"], UNEXPECTED_ERROR_MESSAGE);
        assert_eq!(v["kind"], "UnexpectedError");
    }

    #[tokio::test]
    async fn test_unsupported_method_is_plain_text() {
        let resp = AnalyzeError::UnsupportedMethod.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(resp).await, INVALID_METHOD_MESSAGE);
    }
}
