//! Contract analysis and generation over a [`ChatClient`]

use super::prompts;
use super::{
    ChatClient, ChatCompletion, ChatMessage, ChatRequest, OpenAiChatClient, ResponseFormat,
    SimulatedChatClient,
};
use crate::config::LlmConfig;
use crate::db::models::ClauseCategory;
use crate::errors::{AppError, Result};
use crate::metrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

pub const MISSING_KEY_MESSAGE: &str = "AI service key is missing.";

const ANALYSIS_MAX_TOKENS: u32 = 3000;
const ANALYSIS_TEMPERATURE: f32 = 0.7;
const GENERATION_MAX_TOKENS: u32 = 4000;
const GENERATION_TEMPERATURE: f32 = 0.4;

/// One identified risk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskItem {
    pub clause_text: String,
    pub risk_description: String,
    pub suggested_amendment: String,
}

/// Structured analysis stored on the contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAnalysis {
    pub summary: String,
    pub risks: Vec<RiskItem>,
    /// 1 (lowest risk) to 5 (highest)
    pub rating: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContract {
    pub contract_text: String,
}

/// Tagged outcome of an AI call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LlmOutcome<T> {
    Ok(T),
    Error(String),
}

/// Outcome plus token usage. Usage is always 0 on the error branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmResult<T> {
    pub outcome: LlmOutcome<T>,
    pub tokens_used: i32,
}

impl<T> LlmResult<T> {
    fn ok(payload: T, tokens_used: i32) -> Self {
        Self {
            outcome: LlmOutcome::Ok(payload),
            tokens_used,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            outcome: LlmOutcome::Error(message.into()),
            tokens_used: 0,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, LlmOutcome::Ok(_))
    }
}

/// Gateway to the configured chat provider
#[derive(Clone)]
pub struct LlmGateway {
    client: Option<Arc<dyn ChatClient>>,
    model: String,
}

impl LlmGateway {
    /// `None` means no credentials: every call reports a missing key
    pub fn new(client: Option<Arc<dyn ChatClient>>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Build the gateway for the configured provider
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client: Option<Arc<dyn ChatClient>> = match config.provider.as_str() {
            "simulated" => Some(Arc::new(SimulatedChatClient::new()) as Arc<dyn ChatClient>),
            "openai" => match config.api_key.as_deref().map(str::trim) {
                Some(key) if !key.is_empty() => {
                    let client = OpenAiChatClient::new(
                        key.to_string(),
                        config.api_base.clone(),
                        config.timeout_secs.map(Duration::from_secs),
                    )?;
                    Some(Arc::new(client) as Arc<dyn ChatClient>)
                }
                _ => None,
            },
            other => {
                return Err(AppError::Configuration {
                    message: format!("Unknown LLM provider: {}", other),
                })
            }
        };

        let gateway = Self::new(client, config.model.clone());
        info!(
            provider = gateway.provider_name(),
            model = %gateway.model,
            "LLM gateway ready"
        );
        Ok(gateway)
    }

    pub fn provider_name(&self) -> &'static str {
        self.client
            .as_ref()
            .map(|c| c.provider_name())
            .unwrap_or("none")
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Analyse a contract and return its structured risk assessment
    #[instrument(skip(self, contract_text), fields(chars = contract_text.len()))]
    pub async fn analyze(&self, contract_text: &str) -> LlmResult<ContractAnalysis> {
        let request = self.request(
            prompts::ANALYSIS_SYSTEM_PROMPT,
            prompts::analysis_prompt(contract_text),
            ANALYSIS_MAX_TOKENS,
            ANALYSIS_TEMPERATURE,
            ResponseFormat::JsonObject,
        );

        let completion = match self.call("analyze", &request).await {
            Ok(c) => c,
            Err(message) => return LlmResult::failed(message),
        };

        match parse_analysis(&completion.content) {
            Ok(analysis) => LlmResult::ok(analysis, completion.total_tokens),
            Err(message) => {
                error!(error = %message, "AI contract analysis returned unusable output");
                LlmResult::failed(message)
            }
        }
    }

    /// Draft a contract from user details and retrieved clauses
    #[instrument(skip(self, details, clauses), fields(category = %category))]
    pub async fn generate(
        &self,
        category: ClauseCategory,
        details: &serde_json::Value,
        clauses: &str,
    ) -> LlmResult<GeneratedContract> {
        let request = self.request(
            prompts::GENERATION_SYSTEM_PROMPT,
            prompts::generation_prompt(category, details, clauses),
            GENERATION_MAX_TOKENS,
            GENERATION_TEMPERATURE,
            ResponseFormat::Text,
        );

        match self.call("generate", &request).await {
            Ok(completion) => LlmResult::ok(
                GeneratedContract {
                    contract_text: completion.content,
                },
                completion.total_tokens,
            ),
            Err(message) => LlmResult::failed(message),
        }
    }

    fn request(
        &self,
        system: &str,
        prompt: String,
        max_tokens: u32,
        temperature: f32,
        response_format: ResponseFormat,
    ) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(prompt)],
            max_tokens,
            temperature,
            response_format,
        }
    }

    async fn call(
        &self,
        operation: &'static str,
        request: &ChatRequest,
    ) -> std::result::Result<ChatCompletion, String> {
        let Some(client) = self.client.as_ref() else {
            return Err(MISSING_KEY_MESSAGE.to_string());
        };

        let start = Instant::now();
        let result = client.complete(request).await;
        let elapsed = start.elapsed().as_secs_f64();

        match result {
            Ok(completion) => {
                metrics::record_llm_call(operation, true, completion.total_tokens, elapsed);
                info!(
                    operation,
                    provider = client.provider_name(),
                    tokens = completion.total_tokens,
                    elapsed_ms = (elapsed * 1000.0) as u64,
                    "AI call completed"
                );
                Ok(completion)
            }
            Err(e) => {
                metrics::record_llm_call(operation, false, 0, elapsed);
                error!(operation, provider = client.provider_name(), error = %e, "AI call failed");
                match e {
                    AppError::AiService { message } => Err(message),
                    other => Err(other.to_string()),
                }
            }
        }
    }
}

/// Parse the JSON analysis, tolerating a surrounding code fence.
///
/// The fence is only stripped when it wraps the whole reply; any text
/// after the closing fence leaves it in place and the parse fails.
fn parse_analysis(content: &str) -> std::result::Result<ContractAnalysis, String> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);

    let analysis: ContractAnalysis =
        serde_json::from_str(body.trim()).map_err(|e| format!("Invalid analysis JSON: {}", e))?;

    if !(1..=5).contains(&analysis.rating) {
        return Err(format!(
            "Invalid analysis JSON: rating {} is outside 1..=5",
            analysis.rating
        ));
    }

    Ok(analysis)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn gateway(client: Arc<ScriptedChatClient>) -> LlmGateway {
        LlmGateway::new(Some(client as Arc<dyn ChatClient>), "gpt-4-turbo")
    }

    #[tokio::test]
    async fn test_missing_key_reports_error_without_call() {
        let gateway = LlmGateway::new(None, "gpt-4-turbo");

        let result = gateway.analyze("text").await;
        assert_eq!(result.outcome, LlmOutcome::Error(MISSING_KEY_MESSAGE.to_string()));
        assert_eq!(result.tokens_used, 0);

        let result = gateway
            .generate(ClauseCategory::General, &serde_json::json!({}), "clauses")
            .await;
        assert!(!result.is_ok());
        assert_eq!(result.tokens_used, 0);
    }

    #[tokio::test]
    async fn test_analysis_parses_payload_and_tokens() {
        let client = Arc::new(ScriptedChatClient::replying(VALID_ANALYSIS, 812));
        let result = gateway(client.clone()).analyze("The lease...").await;

        assert_eq!(result.tokens_used, 812);
        match result.outcome {
            LlmOutcome::Ok(analysis) => {
                assert_eq!(analysis.rating, 2);
                assert_eq!(analysis.risks.len(), 1);
            }
            LlmOutcome::Error(e) => panic!("unexpected error: {}", e),
        }
        assert!(client.prompts.lock().unwrap()[0].contains("The lease..."));
    }

    #[tokio::test]
    async fn test_analysis_parse_failure_reports_zero_tokens() {
        let client = Arc::new(ScriptedChatClient::replying("not json", 400));
        let result = gateway(client).analyze("text").await;

        assert!(matches!(result.outcome, LlmOutcome::Error(ref m) if m.starts_with("Invalid analysis JSON")));
        assert_eq!(result.tokens_used, 0);
    }

    #[tokio::test]
    async fn test_analysis_rejects_out_of_range_rating() {
        let reply = r#"{"summary": "s", "risks": [], "rating": 9}"#;
        let client = Arc::new(ScriptedChatClient::replying(reply, 100));
        let result = gateway(client).analyze("text").await;

        assert!(!result.is_ok());
        assert_eq!(result.tokens_used, 0);
    }

    #[tokio::test]
    async fn test_call_failure_carries_message() {
        let client = Arc::new(ScriptedChatClient::failing("connection reset"));
        let result = gateway(client).analyze("text").await;

        assert!(matches!(result.outcome, LlmOutcome::Error(ref m) if m.contains("connection reset")));
        assert_eq!(result.tokens_used, 0);
    }

    #[tokio::test]
    async fn test_generation_returns_raw_text() {
        let client = Arc::new(ScriptedChatClient::replying("RENTAL AGREEMENT ...", 1500));
        let result = gateway(client.clone())
            .generate(
                ClauseCategory::Rental,
                &serde_json::json!({"tenant": "B"}),
                "## Rent Payment\nPay monthly.",
            )
            .await;

        assert_eq!(
            result.outcome,
            LlmOutcome::Ok(GeneratedContract {
                contract_text: "RENTAL AGREEMENT ...".to_string()
            })
        );
        assert_eq!(result.tokens_used, 1500);
        let prompt = client.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("## Rent Payment"));
        assert!(prompt.contains("\"tenant\": \"B\""));
    }

    #[tokio::test]
    async fn test_blank_generation_is_passed_through() {
        let client = Arc::new(ScriptedChatClient::replying("  ", 300));
        let result = gateway(client)
            .generate(ClauseCategory::General, &serde_json::json!({}), "clauses")
            .await;

        assert_eq!(
            result.outcome,
            LlmOutcome::Ok(GeneratedContract {
                contract_text: "  ".to_string()
            })
        );
        assert_eq!(result.tokens_used, 300);
    }

    #[test]
    fn test_code_fence_is_tolerated() {
        let fenced = format!("```json\n{}\n```", VALID_ANALYSIS);
        assert!(parse_analysis(&fenced).is_ok());

        let bare_fence = format!("```\n{}\n```\n", VALID_ANALYSIS);
        assert!(parse_analysis(&bare_fence).is_ok());
    }

    #[test]
    fn test_text_after_closing_fence_is_rejected() {
        let trailing = format!("```json\n{}\n```\nHope this helps.", VALID_ANALYSIS);
        let err = parse_analysis(&trailing).unwrap_err();
        assert!(err.starts_with("Invalid analysis JSON"));
    }

    #[test]
    fn test_from_config_without_key_is_unconfigured() {
        let config = LlmConfig::default();
        let gateway = LlmGateway::from_config(&config).unwrap();
        assert!(!gateway.is_configured());

        let mut config = LlmConfig::default();
        config.provider = "simulated".to_string();
        assert!(LlmGateway::from_config(&config).unwrap().is_configured());

        config.provider = "carrier-pigeon".to_string();
        assert!(LlmGateway::from_config(&config).is_err());
    }
}
