use crate::error::AnalyzeError;
use base64::{Engine as _, engine::general_purpose::STANDARD};

/// An image carried as `data:<mime-type>;base64,<payload>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    raw: String,
    pub mime_type: String,
    pub payload: String,
}

impl DataUrl {
    pub fn parse(raw: &str) -> Result<Self, AnalyzeError> {
        let (header, payload) = raw
            .split_once(',')
            .ok_or_else(|| AnalyzeError::InvalidImageFormat("expected '<header>,<data>'".to_string()))?;

        let header = header
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| AnalyzeError::InvalidImageFormat("header must start with 'data:'".to_string()))?;

        let mut params = header.split(';');
        let mime_type = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        match mime_type.split_once('/') {
            Some(("image", subtype)) if !subtype.is_empty() && !subtype.contains('/') => {}
            _ => {
                return Err(AnalyzeError::InvalidImageFormat(format!(
                    "'{}' is not an image mime type",
                    mime_type
                )));
            }
        }
        if !is_base64 {
            return Err(AnalyzeError::InvalidImageFormat("image data must be base64 encoded".to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            mime_type,
            payload: payload.trim().to_string(),
        })
    }

    /// Raw image bytes, for transports that send bytes instead of the URL.
    pub fn decode(&self) -> Result<Vec<u8>, AnalyzeError> {
        STANDARD
            .decode(self.payload.as_bytes())
            .map_err(|e| AnalyzeError::InvalidImageFormat(format!("invalid base64 payload: {}", e)))
    }

    /// The data URL exactly as the client sent it, header params included.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}
