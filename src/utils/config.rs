//! Environment-based configuration, loaded once at startup.

use serde::Deserialize;
use std::env;

use crate::types::{AppError, Result};

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub store: StoreConfig,
    pub retrieval: RetrievalConfig,
}

/// LLM provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub openai_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub embedding_model: String,
}

/// Vector store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// ChromaDB server URL; when unset the in-memory store is used.
    pub chromadb_url: Option<String>,
    pub collection: String,
}

/// Retrieval tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Number of documents handed to the answer composer.
    pub top_k: usize,
    /// Multiplier applied to `top_k` before the filtered search, so a
    /// narrow filter still leaves enough candidates after reranking.
    pub over_fetch_factor: usize,
}

impl Config {
    /// Load configuration from the environment (and `.env` when present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let parse_usize = |key: &str, default: usize| -> Result<usize> {
            match env::var(key) {
                Ok(v) => v.parse().map_err(|_| {
                    AppError::Configuration(format!("{} must be a positive integer, got '{}'", key, v))
                }),
                Err(_) => Ok(default),
            }
        };

        Ok(Config {
            llm: LlmConfig {
                openai_api_key: env::var("OPENAI_API_KEY").ok(),
                openai_api_base: env::var("OPENAI_API_BASE")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                openai_model: env::var("OPENAI_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                ollama_url: env::var("OLLAMA_URL")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string()),
                ollama_model: env::var("OLLAMA_MODEL")
                    .unwrap_or_else(|_| "llama3.2".to_string()),
                embedding_model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
            },
            store: StoreConfig {
                chromadb_url: env::var("CHROMADB_URL").ok(),
                collection: env::var("POLICY_COLLECTION")
                    .unwrap_or_else(|_| "company_policies".to_string()),
            },
            retrieval: RetrievalConfig {
                top_k: parse_usize("RETRIEVAL_TOP_K", 20)?,
                over_fetch_factor: parse_usize("RETRIEVAL_OVER_FETCH", 3)?,
            },
        })
    }
}
