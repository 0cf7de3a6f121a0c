//! Deterministic offline chat provider
//!
//! Reads the contract or clauses back out of the prompt and answers with a
//! fixed-shape analysis or a templated agreement. Used for demos and tests.

use super::prompts::{self, CATEGORY_HEADER, CLAUSES_HEADER, CONTRACT_HEADER};
use super::{ChatClient, ChatCompletion, ChatRequest, ResponseFormat};
use crate::errors::Result;
use async_trait::async_trait;

/// Simulated provider
#[derive(Debug, Clone, Default)]
pub struct SimulatedChatClient;

impl SimulatedChatClient {
    pub fn new() -> Self {
        Self
    }
}

/// Risk level derived from the first 50 characters of the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

pub fn risk_score(contract_text: &str) -> u32 {
    contract_text
        .chars()
        .take(50)
        .map(|c| c as u32)
        .fold(0u32, |acc, c| acc.wrapping_add(c))
        % 100
}

pub fn risk_level(score: u32) -> RiskLevel {
    if score > 70 {
        RiskLevel::High
    } else if score > 40 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn simulated_analysis(contract_text: &str) -> serde_json::Value {
    let level = risk_level(risk_score(contract_text));
    let words = contract_text.split_whitespace().count();
    let excerpt: String = contract_text.chars().take(120).collect();

    let (summary, risk, amendment, rating) = match level {
        RiskLevel::High => (
            "High risk: the termination clauses and the allocation of financial liability are seriously ambiguous.",
            "Termination rights and liability caps are not defined.",
            "Define termination events, notice periods and a liability cap explicitly.",
            5,
        ),
        RiskLevel::Medium => (
            "Medium risk: the contract is structurally sound but lacks a clear mechanism for resolving technical disputes.",
            "No dispute resolution procedure for technical disagreements.",
            "Add an escalation and expert determination clause.",
            3,
        ),
        RiskLevel::Low => (
            "Low risk: the contract is tightly drafted and covers the essential legal aspects.",
            "Performance obligations are not measurable.",
            "Attach an annex with key performance indicators to ensure compliance.",
            1,
        ),
    };

    serde_json::json!({
        "summary": format!("{} Total words: {}.", summary, words),
        "risks": [{
            "clause_text": excerpt,
            "risk_description": risk,
            "suggested_amendment": amendment,
        }],
        "rating": rating,
    })
}

fn simulated_contract(category: &str, clauses: &str) -> String {
    let date = chrono::Utc::now().format("%Y-%m-%d");

    format!(
        "{category} Agreement\n\
         Date: {date}\n\n\
         Article 1 (Parties)\n\
         This agreement is entered into between the First Party (the \"Provider\") \
         and the Second Party (the \"Beneficiary\").\n\n\
         Article 2 (Purpose)\n\
         The parties agree that the purpose of this document is to regulate the \
         {category} services in line with the applicable legal principles.\n\n\
         Article 3 (Agreed Clauses)\n\
         {clauses}\n\n\
         Article 4 (Term and Termination)\n\
         The term of this agreement is one year, renewable by written consent of both \
         parties, with a penalty of five percent (5%) of the total value for unjustified \
         early termination.\n\n\
         Article 5 (Governing Law)\n\
         This agreement is governed by and construed in accordance with the laws of \
         [jurisdiction].\n\n\
         Signatures:\n\
         (Provider) ....................  (Beneficiary) ....................\n"
    )
}

fn estimate_tokens(prompt: &str, output: &str) -> i32 {
    let chars = prompt.chars().count() + output.chars().count();
    ((chars / 4).max(1)).min(i32::MAX as usize) as i32
}

#[async_trait]
impl ChatClient for SimulatedChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let prompt = request.user_prompt();

        let content = match request.response_format {
            ResponseFormat::JsonObject => {
                let contract = prompts::extract_section(prompt, CONTRACT_HEADER).unwrap_or(prompt);
                simulated_analysis(contract).to_string()
            }
            ResponseFormat::Text => {
                let category = prompts::extract_line(prompt, CATEGORY_HEADER).unwrap_or("General");
                let clauses = prompts::extract_section(prompt, CLAUSES_HEADER).unwrap_or("");
                simulated_contract(category, clauses)
            }
        };

        Ok(ChatCompletion {
            total_tokens: estimate_tokens(prompt, &content),
            content,
        })
    }

    fn provider_name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ClauseCategory;
    use crate::llm::ChatMessage;

    fn request(prompt: String, format: ResponseFormat) -> ChatRequest {
        ChatRequest {
            model: "sim".to_string(),
            messages: vec![ChatMessage::system("s"), ChatMessage::user(prompt)],
            max_tokens: 100,
            temperature: 0.0,
            response_format: format,
        }
    }

    #[test]
    fn test_risk_score_uses_first_fifty_chars() {
        // 'A' is 65
        assert_eq!(risk_score("A"), 65);
        assert_eq!(risk_score("AA"), 30);
        let long = "A".repeat(50);
        assert_eq!(risk_score(&long), risk_score(&format!("{}zzzz", long)));
    }

    #[test]
    fn test_risk_levels() {
        assert_eq!(risk_level(71), RiskLevel::High);
        assert_eq!(risk_level(70), RiskLevel::Medium);
        assert_eq!(risk_level(41), RiskLevel::Medium);
        assert_eq!(risk_level(40), RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_analysis_is_valid_json_with_rating() {
        let client = SimulatedChatClient::new();
        let completion = client
            .complete(&request(prompts::analysis_prompt("A"), ResponseFormat::JsonObject))
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&completion.content).unwrap();
        assert_eq!(value["rating"], 3);
        assert_eq!(value["risks"][0]["clause_text"], "A");
        assert!(completion.total_tokens > 0);
    }

    #[tokio::test]
    async fn test_contract_embeds_clauses() {
        let client = SimulatedChatClient::new();
        let prompt = prompts::generation_prompt(
            ClauseCategory::Nda,
            &serde_json::json!({}),
            "## Confidential Information\nKeep it secret.",
        );
        let completion = client
            .complete(&request(prompt, ResponseFormat::Text))
            .await
            .unwrap();

        assert!(completion.content.starts_with("Non-disclosure Agreement"));
        assert!(completion.content.contains("## Confidential Information\nKeep it secret."));
    }
}
