//! Smart Legal Platform Common Library
//!
//! Shared code for the contracts API and the manual intake service:
//! - Database models, repository and in-memory store
//! - Knowledge base clause retrieval
//! - LLM gateway for contract analysis and generation
//! - Analysis and generation workflows with token accounting
//! - Manual request document store
//! - Error types, configuration, metrics and logging setup

pub mod auth;
pub mod config;
pub mod db;
pub mod docstore;
pub mod errors;
pub mod extract;
pub mod lifecycle;
pub mod llm;
pub mod metrics;
pub mod observability;
pub mod services;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use db::{ContractStore, MemoryStore, Repository};
pub use llm::LlmGateway;
pub use services::LegalServices;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default chat model used for analysis and generation
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4-turbo";
