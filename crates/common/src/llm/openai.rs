//! OpenAI-compatible chat-completion client

use super::{ChatClient, ChatCompletion, ChatMessage, ChatRequest, ResponseFormat};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for `{api_base}/chat/completions`
pub struct OpenAiChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<WireResponseFormat>,
}

#[derive(Serialize)]
struct WireResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    total_tokens: i64,
}

impl OpenAiChatClient {
    /// Create a new client. Without `timeout` requests wait as long as the
    /// connection stays open.
    pub fn new(api_key: String, base_url: String, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| AppError::Configuration {
            message: format!("Failed to create HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = WireRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: match request.response_format {
                ResponseFormat::JsonObject => Some(WireResponseFormat {
                    kind: "json_object",
                }),
                ResponseFormat::Text => None,
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::AiService {
                message: format!("AI service request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AiService {
                message: format!("AI service error {}: {}", status, body),
            });
        }

        let parsed: WireResponse = response.json().await.map_err(|e| AppError::AiService {
            message: format!("Failed to parse AI service response: {}", e),
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::AiService {
                message: "Empty response from AI service".to_string(),
            })?;

        let total_tokens = parsed
            .usage
            .map(|u| u.total_tokens.clamp(0, i32::MAX as i64) as i32)
            .unwrap_or(0);

        Ok(ChatCompletion {
            content,
            total_tokens,
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_requests_ask_for_json_object() {
        let messages = vec![ChatMessage::user("hi")];
        let body = WireRequest {
            model: "gpt-4-turbo",
            messages: &messages,
            max_tokens: 3000,
            temperature: 0.7,
            response_format: Some(WireResponseFormat {
                kind: "json_object",
            }),
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["max_tokens"], 3000);
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_text_requests_omit_response_format() {
        let messages = vec![ChatMessage::user("hi")];
        let body = WireRequest {
            model: "gpt-4-turbo",
            messages: &messages,
            max_tokens: 4000,
            temperature: 0.4,
            response_format: None,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("response_format").is_none());
    }

    #[test]
    fn test_usage_is_read_from_total_tokens() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}],
                      "usage":{"prompt_tokens":10,"completion_tokens":5,"total_tokens":15}}"#;
        let parsed: WireResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.usage.unwrap().total_tokens, 15);
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("ok"));
    }
}
