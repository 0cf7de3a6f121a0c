//! Chat-completion abstraction
//!
//! Provides a unified interface over chat providers:
//! - OpenAI-compatible `/chat/completions` endpoints
//! - A deterministic simulated provider for offline runs
//!
//! [`LlmGateway`] sits on top and implements contract analysis and
//! generation with their fixed templates and parameters.

mod gateway;
mod openai;
mod prompts;
mod simulated;

pub use gateway::{
    ContractAnalysis, GeneratedContract, LlmGateway, LlmOutcome, LlmResult, RiskItem,
    MISSING_KEY_MESSAGE,
};
#[cfg(test)]
pub(crate) use gateway::testing;
pub use openai::OpenAiChatClient;
pub use simulated::SimulatedChatClient;

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Output format the provider is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

/// Provider-independent completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

impl ChatRequest {
    /// Content of the last user message
    pub fn user_prompt(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

/// Completion text plus the provider's total token count
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub content: String,
    pub total_tokens: i32,
}

/// Trait for chat-completion providers
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Run one completion. No retries.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion>;

    /// Provider name for logs
    fn provider_name(&self) -> &'static str;
}
