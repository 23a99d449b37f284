//! Vector store abstraction.
//!
//! The document store is an external collaborator: it persists chunk text,
//! metadata, and embeddings, and answers filtered similarity searches. The
//! trait below is the whole surface the rest of the crate relies on, with
//! an in-memory implementation for tests and local runs and a ChromaDB
//! implementation behind the `chromadb` feature.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::rag::embeddings::Embedder;
use crate::store::filter::FilterExpression;
use crate::types::{AppError, Chunk, ChunkMetadata, RankedResult, Result};

// ============================================================================
// Vector Store Provider Configuration
// ============================================================================

/// Configuration for vector store providers.
#[derive(Debug, Clone)]
pub enum VectorStoreProvider {
    /// ChromaDB server (requires the `chromadb` feature).
    #[cfg(feature = "chromadb")]
    ChromaDB {
        /// ChromaDB server URL (e.g. `http://localhost:8000`).
        url: String,
    },

    /// In-memory store; data is lost when the process exits.
    InMemory,
}

impl VectorStoreProvider {
    /// Create a store instance from this provider configuration.
    ///
    /// The embedder is injected because every backend embeds queries (and,
    /// for backends without a server-side embedding function, documents)
    /// on the client side.
    pub async fn create_store(&self, embedder: Arc<dyn Embedder>) -> Result<Box<dyn VectorStore>> {
        match self {
            #[cfg(feature = "chromadb")]
            VectorStoreProvider::ChromaDB { url } => {
                let store = super::chroma::ChromaStore::new(url, embedder).await?;
                Ok(Box::new(store))
            }

            VectorStoreProvider::InMemory => Ok(Box::new(InMemoryVectorStore::new(embedder))),
        }
    }

    /// Select a provider from the environment: `CHROMADB_URL` when set
    /// (and the feature is enabled), otherwise in-memory.
    pub fn from_env() -> Self {
        #[cfg(feature = "chromadb")]
        if let Ok(url) = std::env::var("CHROMADB_URL") {
            if !url.is_empty() {
                return VectorStoreProvider::ChromaDB { url };
            }
        }

        VectorStoreProvider::InMemory
    }
}

// ============================================================================
// Vector Store Trait
// ============================================================================

/// Abstract interface to the document store.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Name of the backing provider, for diagnostics.
    fn provider_name(&self) -> &'static str;

    /// Create a new, empty collection.
    ///
    /// # Errors
    ///
    /// Returns an error if a collection with this name already exists.
    async fn create_collection(&self, name: &str) -> Result<()>;

    /// Delete a collection and all its chunks.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// List collection names.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Add a batch of chunks, creating the collection if needed.
    ///
    /// The whole batch is stored or none of it is. Returns the generated
    /// chunk ids.
    async fn add_documents(&self, collection: &str, chunks: &[Chunk]) -> Result<Vec<String>>;

    /// Filtered similarity search.
    ///
    /// The filter is applied as given; this layer does not validate field
    /// names or values against the metadata schema. Results are ordered
    /// ascending by distance. An empty result set is not an error.
    ///
    /// # Errors
    ///
    /// [`AppError::InvalidFilter`] when the store rejects the filter,
    /// [`AppError::Collaborator`] when the store is unreachable.
    async fn similarity_search(
        &self,
        collection: &str,
        query: &str,
        filter: Option<&FilterExpression>,
        limit: usize,
    ) -> Result<Vec<RankedResult>>;

    /// Number of chunks in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;
}

// ============================================================================
// In-Memory Vector Store
// ============================================================================

struct StoredChunk {
    content: String,
    metadata: ChunkMetadata,
    wire_metadata: Map<String, Value>,
    embedding: Vec<f32>,
}

/// In-memory store using cosine distance.
///
/// Filter evaluation runs locally over the flat wire metadata, with the
/// same scalar semantics a remote store applies.
pub struct InMemoryVectorStore {
    embedder: Arc<dyn Embedder>,
    collections: RwLock<HashMap<String, Vec<StoredChunk>>>,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 1.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 1.0;
        }

        // Distance must be non-negative; float error can push the
        // similarity slightly past 1.
        (1.0 - dot / (norm_a * norm_b)).max(0.0)
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn provider_name(&self) -> &'static str {
        "in-memory"
    }

    async fn create_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write();
        if collections.contains_key(name) {
            return Err(AppError::InvalidInput(format!(
                "collection '{}' already exists",
                name
            )));
        }
        collections.insert(name.to_string(), Vec::new());
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections
            .write()
            .remove(name)
            .ok_or_else(|| AppError::NotFound(format!("collection '{}' not found", name)))?;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn add_documents(&self, collection: &str, chunks: &[Chunk]) -> Result<Vec<String>> {
        let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        // Embed before taking the lock; the batch lands atomically after.
        let embeddings = self.embedder.embed(&contents).await?;
        if embeddings.len() != chunks.len() {
            return Err(AppError::Store(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let mut stored = Vec::with_capacity(chunks.len());
        let mut ids = Vec::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            ids.push(Uuid::new_v4().to_string());
            stored.push(StoredChunk {
                content: chunk.content.clone(),
                metadata: chunk.metadata.clone(),
                wire_metadata: chunk.metadata.to_wire_map(),
                embedding,
            });
        }

        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .extend(stored);

        Ok(ids)
    }

    async fn similarity_search(
        &self,
        collection: &str,
        query: &str,
        filter: Option<&FilterExpression>,
        limit: usize,
    ) -> Result<Vec<RankedResult>> {
        let query_embedding = self
            .embedder
            .embed(std::slice::from_ref(&query.to_string()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Store("embedder returned no vector for query".to_string()))?;

        let collections = self.collections.read();
        let chunks = collections
            .get(collection)
            .ok_or_else(|| AppError::NotFound(format!("collection '{}' not found", collection)))?;

        let mut results: Vec<RankedResult> = chunks
            .iter()
            .filter(|c| match filter {
                Some(f) => f.matches(&c.wire_metadata),
                None => true,
            })
            .map(|c| RankedResult {
                content: c.content.clone(),
                metadata: c.metadata.clone(),
                distance: Self::cosine_distance(&query_embedding, &c.embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read();
        let chunks = collections
            .get(collection)
            .ok_or_else(|| AppError::NotFound(format!("collection '{}' not found", collection)))?;
        Ok(chunks.len())
    }
}

// ============================================================================
// Tests
// ============================================================================
