//! Dense embedding seam.
//!
//! Embeddings come from a hosted API rather than a local model; the trait
//! exists so the in-memory store and the tests can swap in a deterministic
//! embedder.

use async_trait::async_trait;

use crate::types::Result;

/// Produces dense embeddings for a batch of texts.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed each input text, preserving order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Model identifier, for diagnostics.
    fn model_name(&self) -> &str;
}

#[cfg(feature = "openai")]
pub use openai::OpenAIEmbedder;

#[cfg(feature = "openai")]
mod openai {
    use async_openai::{config::OpenAIConfig, types::embeddings::CreateEmbeddingRequestArgs, Client};
    use async_trait::async_trait;

    use crate::types::{AppError, Result};

    /// Embedder backed by the OpenAI embeddings endpoint (or a compatible
    /// API behind a custom base URL).
    pub struct OpenAIEmbedder {
        client: Client<OpenAIConfig>,
        model: String,
    }

    impl OpenAIEmbedder {
        pub fn new(api_key: String, api_base: String, model: String) -> Self {
            let config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(api_base);
            Self {
                client: Client::with_config(config),
                model,
            }
        }
    }

    #[async_trait]
    impl super::Embedder for OpenAIEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }

            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(texts.to_vec())
                .build()
                .map_err(|e| AppError::Collaborator(format!("failed to build embedding request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| AppError::Collaborator(format!("embedding API error: {}", e)))?;

            let mut data = response.data;
            // Output order is only guaranteed via the index field.
            data.sort_by_key(|d| d.index);
            Ok(data.into_iter().map(|d| d.embedding).collect())
        }

        fn model_name(&self) -> &str {
            &self.model
        }
    }
}
