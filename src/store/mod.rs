// ===== Vector Store =====

pub mod filter;
pub mod vectorstore;

#[cfg(feature = "chromadb")]
pub mod chroma;

pub use filter::FilterExpression;
pub use vectorstore::{InMemoryVectorStore, VectorStore, VectorStoreProvider};
