//! Sage - conflict-aware company policy assistant.
//!
//! Retrieval-augmented question answering over company policy documents.
//! Documents are chunked by an LLM into metadata-tagged sections, stored
//! with embeddings in a vector database, and queried through a pipeline
//! that synthesizes a metadata filter from the question, over-fetches
//! candidates, reranks them by distance, and composes a final answer with
//! a second LLM call.
//!
//! # Architecture
//!
//! - [`agents`] - single-method capability traits wrapping each LLM step
//! - [`rag`] - retrieval orchestration, ingestion, and embeddings
//! - [`store`] - vector store trait, filter dialect, and backends
//! - [`llm`] - provider-agnostic LLM clients
//! - [`cli`] - command-line interface and terminal output
//!
//! # Example
//!
//! ```rust,ignore
//! use sage::agents::{LlmAnswerComposer, LlmFilterSynthesizer};
//! use sage::rag::Retriever;
//!
//! let retriever = Retriever::new(synthesizer, store);
//! let (docs, filter) = retriever.retrieve("company_policies", question, 20).await?;
//! ```

pub mod agents;
pub mod cli;
pub mod llm;
pub mod rag;
pub mod store;
pub mod types;
pub mod utils;

pub use agents::{Assistant, AssistantReply, SourceDocument};
pub use llm::{LLMClient, Provider};
pub use rag::{IngestReport, Ingestor, Retriever};
pub use store::{FilterExpression, InMemoryVectorStore, VectorStore, VectorStoreProvider};
pub use types::{AppError, Chunk, ChunkMetadata, RankedResult, Result};
pub use utils::config::Config;
pub use utils::json::extract_json;
