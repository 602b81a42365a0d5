use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_BASE_URL;

pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Client for an OpenAI-compatible chat-completion endpoint
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatClient {
    /// Models offered in the settings menu
    pub const MODELS: &'static [(&'static str, &'static str)] = &[
        ("deepseek-chat", "DeepSeek V3 - Fast, follows the JSON format well"),
        ("deepseek-reasoner", "DeepSeek R1 - Slower, reasons before answering"),
    ];

    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request(&self, messages: &[Message]) -> ChatRequest {
        // Deterministic output keeps the JSON shape stable
        ChatRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            temperature: Some(0.0),
            max_tokens: Some(2048),
            stream: false,
        }
    }

    /// Send a chat request and return the first choice's content
    pub async fn chat(&self, messages: &[Message]) -> Result<String> {
        let request = self.request(messages);

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to the chat API")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Chat API returned {}", status);
            anyhow::bail!("Chat API error ({}): {}", status, text);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat API response")?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default().trim().to_string())
            .context("No response from the chat API")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = ChatClient::new(
            "key".to_string(),
            Some("https://example.test/v1/".to_string()),
            None,
        );
        assert_eq!(client.endpoint(), "https://example.test/v1/chat/completions");
        assert_eq!(client.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_request_is_deterministic() {
        let client = ChatClient::new("key".to_string(), None, Some("deepseek-reasoner".to_string()));
        let messages = vec![Message {
            role: "user".to_string(),
            content: "hi".to_string(),
        }];
        let body = serde_json::to_value(client.request(&messages)).unwrap();
        assert_eq!(body["model"], "deepseek-reasoner");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["max_tokens"], 2048);
        assert_eq!(body["stream"], false);
        assert_eq!(client.endpoint(), "https://api.deepseek.com/chat/completions");
    }

    #[test]
    fn test_response_with_null_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
