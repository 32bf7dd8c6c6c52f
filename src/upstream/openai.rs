use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: Vec<OpenAIContentItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAIContentItem {
    Text { text: String },
    ImageUrl { image_url: OpenAIImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIImageUrl {
    pub url: String,
}

impl OpenAIRequest {
    /// One user turn holding the prompt and the image.
    pub fn vision(model: &str, prompt: &str, image_url: String, max_tokens: u32) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: vec![
                    OpenAIContentItem::Text { text: prompt.to_string() },
                    OpenAIContentItem::ImageUrl {
                        image_url: OpenAIImageUrl { url: image_url },
                    },
                ],
            }],
            max_tokens: Some(max_tokens),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIChoice {
    #[serde(default)]
    pub index: i32,
    pub message: OpenAIResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    pub content: Option<String>,
}

impl OpenAIResponse {
    pub fn answer(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_vision_request_shape() {
        let req = OpenAIRequest::vision("gpt-4o-mini", "classify", "data:image/png;base64,AAAA".to_string(), 4000);
        let v: Value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            json!({
                "model": "gpt-4o-mini",
                "messages": [{
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "classify" },
                        { "type": "image_url", "image_url": { "url": "data:image/png;base64,AAAA" } }
                    ]
                }],
                "max_tokens": 4000
            })
        );
    }

    #[test]
    fn test_answer_from_first_choice() {
        let resp: OpenAIResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "Recyclable\nRinse it." }, "finish_reason": "stop" }
            ]
        }))
        .unwrap();
        assert_eq!(resp.answer(), Some("Recyclable\nRinse it."));
    }

    #[test]
    fn test_null_content_has_no_answer() {
        let resp: OpenAIResponse = serde_json::from_value(json!({
            "choices": [ { "message": { "role": "assistant", "content": null } } ]
        }))
        .unwrap();
        assert_eq!(resp.answer(), None);
    }
}
