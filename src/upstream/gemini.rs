use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>, // "user" or "model"
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeminiPart {
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        thought: Option<bool>,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    // functionCall, executableCode, ... never requested here
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiInlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

impl GeminiRequest {
    /// `[prompt, {mime_type, bytes}]` as a single user turn; `data` is base64.
    pub fn vision(prompt: &str, mime_type: &str, data: String) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![
                    GeminiPart::Text { text: prompt.to_string(), thought: None },
                    GeminiPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: mime_type.to_string(),
                            data,
                        },
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(rename = "modelVersion")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl GeminiResponse {
    /// Concatenated non-thought text of the first candidate.
    pub fn answer(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| match part {
                GeminiPart::Text { text, thought } if thought != &Some(true) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_vision_request_shape() {
        let req = GeminiRequest::vision("identify", "image/jpeg", "AAAA".to_string());
        let v: Value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "identify" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "AAAA" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_answer_skips_thoughts() {
        let resp: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "#1 PET\n" },
                        { "text": "Water bottle." }
                    ]
                },
                "finishReason": "STOP"
            }],
            "modelVersion": "gemini-1.5-flash"
        }))
        .unwrap();
        assert_eq!(resp.answer().as_deref(), Some("#1 PET\nWater bottle."));
    }

    #[test]
    fn test_blocked_prompt_has_no_answer() {
        let resp: GeminiResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert_eq!(resp.answer(), None);
    }
}
