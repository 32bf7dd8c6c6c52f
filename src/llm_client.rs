use crate::config::{ApiType, Config};
use crate::data_url::DataUrl;
use crate::error::AnalyzeError;
use crate::request_id::RequestId;
use crate::upstream::gemini::{GeminiRequest, GeminiResponse};
use crate::upstream::openai::{OpenAIRequest, OpenAIResponse};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sends one image to the configured vision model and returns its raw answer.
#[derive(Debug)]
pub struct LlmClient {
    http_client: Arc<reqwest::Client>,
    config: Arc<Config>,
}

impl LlmClient {
    pub fn new(http_client: Arc<reqwest::Client>, config: Arc<Config>) -> Self {
        Self { http_client, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn build_target_url(config: &Config) -> String {
        let api_base = config.api_base();
        let path = match config.api_type {
            ApiType::OpenAI => "chat/completions".to_string(),
            ApiType::Gemini => format!("models/{}:generateContent", config.model()),
        };
        if api_base.ends_with('/') { format!("{}{}", api_base, path) } else { format!("{}/{}", api_base, path) }
    }

    /// Read on every call so a key exported after startup is picked up.
    fn api_key(&self) -> Result<String, AnalyzeError> {
        if let Some(key) = self.config.llm_params.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }
        let var = self.config.api_key_env();
        match std::env::var(var) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(AnalyzeError::MissingCredential(var.to_string())),
        }
    }

    pub async fn analyze(&self, image: &DataUrl, request_id: Option<&RequestId>) -> Result<String, AnalyzeError> {
        let prompt = self.config.taxonomy().prompt();
        let target_url = Self::build_target_url(&self.config);

        match self.config.api_type {
            ApiType::OpenAI => {
                let body = OpenAIRequest::vision(self.config.model(), prompt, image.as_str().to_string(), self.config.max_tokens());
                let api_key = self.api_key()?;
                info!("Forwarding image ({}) to: {}", image.mime_type, target_url);
                let request = self
                    .http_client
                    .post(&target_url)
                    .header("Authorization", format!("Bearer {}", api_key))
                    .json(&body);
                let response: OpenAIResponse = send(request, request_id).await?;
                response
                    .answer()
                    .map(str::to_string)
                    .ok_or_else(|| AnalyzeError::UpstreamCallFailure("response contained no message content".to_string()))
            }
            ApiType::Gemini => {
                // Decoding validates the payload before anything leaves the process.
                let bytes = image.decode()?;
                let body = GeminiRequest::vision(prompt, &image.mime_type, STANDARD.encode(&bytes));
                let api_key = self.api_key()?;
                info!("Forwarding image ({}, {} bytes) to: {}", image.mime_type, bytes.len(), target_url);
                let request = self
                    .http_client
                    .post(&target_url)
                    .query(&[("key", api_key.as_str())])
                    .json(&body);
                let response: GeminiResponse = send(request, request_id).await?;
                response
                    .answer()
                    .ok_or_else(|| AnalyzeError::UpstreamCallFailure("response contained no candidate text".to_string()))
            }
        }
    }
}

async fn send<T: DeserializeOwned>(
    mut request: reqwest::RequestBuilder,
    request_id: Option<&RequestId>,
) -> Result<T, AnalyzeError> {
    // Propagate request id upstream
    if let Some(val) = request_id.and_then(|id| HeaderValue::from_str(&id.0).ok()) {
        request = request.header("x-request-id", val);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        warn!("Upstream request failed with status {}: {}", status, error_text);
        return Err(AnalyzeError::UpstreamCallFailure(format!("API error ({}): {}", status, error_text)));
    }

    let text = response.text().await?;
    debug!("raw response: {}", text);
    serde_json::from_str(&text)
        .map_err(|e| AnalyzeError::UpstreamCallFailure(format!("Failed to parse response: {}", e)))
}
