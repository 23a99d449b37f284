//! LLM client abstractions and provider management
//!
//! Every generative step in the pipeline (filter synthesis, document
//! chunking, answer composition) goes through [`LLMClient`], so providers
//! can be swapped without touching the pipeline code.

use crate::types::{AppError, Result};
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// # Supported Providers
///
/// | Provider | Notes |
/// |----------|-------|
/// | OpenAI | Also covers OpenAI-compatible APIs via `api_base` |
/// | Ollama | Local inference |
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API provider (including compatible APIs behind a custom base URL)
    #[cfg(feature = "openai")]
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local LLM provider
    #[cfg(feature = "ollama")]
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when the provider cannot be
    /// constructed from its settings.
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            ))),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone()).await?,
            )),
        }
    }

    /// Select a provider from the loaded configuration.
    ///
    /// OpenAI wins when an API key is present; Ollama is the fallback when
    /// that feature is compiled in.
    pub fn from_config(config: &crate::utils::config::LlmConfig) -> Result<Self> {
        #[cfg(feature = "openai")]
        if let Some(api_key) = &config.openai_api_key {
            return Ok(Provider::OpenAI {
                api_key: api_key.clone(),
                api_base: config.openai_api_base.clone(),
                model: config.openai_model.clone(),
            });
        }

        #[cfg(feature = "ollama")]
        {
            return Ok(Provider::Ollama {
                base_url: config.ollama_url.clone(),
                model: config.ollama_model.clone(),
            });
        }

        #[allow(unreachable_code)]
        Err(AppError::Configuration(
            "no LLM provider available: set OPENAI_API_KEY or enable the ollama feature"
                .to_string(),
        ))
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI { .. } => "OpenAI",
            #[cfg(feature = "ollama")]
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// The model this provider is configured for
    pub fn model(&self) -> &str {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI { model, .. } => model,
            #[cfg(feature = "ollama")]
            Provider::Ollama { model, .. } => model,
        }
    }
}
