// ===== RAG Pipeline =====

pub mod embeddings;
pub mod ingest;
pub mod retriever;

pub use embeddings::Embedder;
pub use ingest::{IngestReport, Ingestor};
pub use retriever::{Retriever, DEFAULT_OVER_FETCH_FACTOR};
