//! ChromaDB-backed vector store.
//!
//! Documents are embedded on the client side (through the injected
//! [`Embedder`]) and stored with their flat metadata maps; the filter is
//! forwarded untouched as the `where` clause. Query errors that identify
//! a rejected `where` clause come back as [`AppError::InvalidFilter`];
//! transport and server failures stay [`AppError::Collaborator`].

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use chromadb::client::{ChromaAuthMethod, ChromaClient, ChromaClientOptions};
use chromadb::collection::{CollectionEntries, QueryOptions};

use crate::rag::embeddings::Embedder;
use crate::store::filter::FilterExpression;
use crate::store::vectorstore::VectorStore;
use crate::types::{AppError, Chunk, ChunkMetadata, RankedResult, Result};

/// Vector store backed by a running ChromaDB server.
pub struct ChromaStore {
    client: ChromaClient,
    embedder: Arc<dyn Embedder>,
}

impl ChromaStore {
    /// Connect to a ChromaDB server.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Collaborator`] when the server is unreachable.
    pub async fn new(url: &str, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let client = ChromaClient::new(ChromaClientOptions {
            url: Some(url.to_string()),
            auth: ChromaAuthMethod::None,
            database: "default_database".to_string(),
        })
        .await
        .map_err(|e| AppError::Collaborator(format!("cannot reach ChromaDB at {}: {}", url, e)))?;

        Ok(Self { client, embedder })
    }
}

#[async_trait]
impl VectorStore for ChromaStore {
    fn provider_name(&self) -> &'static str {
        "chromadb"
    }

    async fn create_collection(&self, name: &str) -> Result<()> {
        self.client
            .create_collection(name, None, false)
            .await
            .map_err(|e| AppError::Store(format!("failed to create collection '{}': {}", name, e)))?;
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.client
            .delete_collection(name)
            .await
            .map_err(|e| AppError::NotFound(format!("failed to delete collection '{}': {}", name, e)))?;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| AppError::Collaborator(format!("failed to list collections: {}", e)))?;
        Ok(collections.into_iter().map(|c| c.name().to_string()).collect())
    }

    async fn add_documents(&self, collection: &str, chunks: &[Chunk]) -> Result<Vec<String>> {
        let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed(&contents).await?;

        let ids: Vec<String> = chunks.iter().map(|_| Uuid::new_v4().to_string()).collect();
        let metadatas = chunks.iter().map(|c| c.metadata.to_wire_map()).collect();

        let target = self
            .client
            .get_or_create_collection(collection, None)
            .await
            .map_err(|e| AppError::Collaborator(format!("failed to open collection '{}': {}", collection, e)))?;

        let entries = CollectionEntries {
            ids: ids.iter().map(String::as_str).collect(),
            embeddings: Some(embeddings),
            metadatas: Some(metadatas),
            documents: Some(contents.iter().map(String::as_str).collect()),
        };

        target
            .add(entries, None)
            .await
            .map_err(|e| AppError::Store(format!("failed to add {} chunks: {}", chunks.len(), e)))?;

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

        let target = self
            .client
            .get_collection(collection)
            .await
            .map_err(|e| AppError::NotFound(format!("collection '{}' not found: {}", collection, e)))?;

        let options = QueryOptions {
            query_texts: None,
            query_embeddings: Some(vec![query_embedding]),
            where_metadata: filter.map(FilterExpression::to_value),
            where_document: None,
            n_results: Some(limit),
            include: Some(vec!["documents", "metadatas", "distances"]),
        };

        let had_filter = filter.is_some();
        let result = target
            .query(options, None)
            .await
            .map_err(|e| classify_query_error(&e.to_string(), had_filter))?;

        let documents = result
            .documents
            .and_then(|mut d| if d.is_empty() { None } else { Some(d.remove(0)) })
            .unwrap_or_default();
        let metadatas = result
            .metadatas
            .and_then(|mut m| if m.is_empty() { None } else { Some(m.remove(0)) })
            .unwrap_or_default();
        let distances = result
            .distances
            .and_then(|mut d| if d.is_empty() { None } else { Some(d.remove(0)) })
            .unwrap_or_default();

        let mut ranked = Vec::with_capacity(documents.len());
        for ((content, metadata), distance) in documents.into_iter().zip(metadatas).zip(distances) {
            let metadata = metadata.ok_or_else(|| {
                AppError::Store("store returned a chunk without metadata".to_string())
            })?;
            let metadata: ChunkMetadata =
                serde_json::from_value(serde_json::Value::Object(metadata))
                    .map_err(|e| AppError::Store(format!("stored metadata is not valid: {}", e)))?;
            ranked.push(RankedResult {
                content,
                metadata,
                distance,
            });
        }

        Ok(ranked)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let target = self
            .client
            .get_collection(collection)
            .await
            .map_err(|e| AppError::NotFound(format!("collection '{}' not found: {}", collection, e)))?;
        target
            .count()
            .await
            .map_err(|e| AppError::Collaborator(format!("count failed: {}", e)))
    }
}

/// Chroma reports a malformed `where` clause as a 4xx validation error
/// mentioning the clause; transport and server failures carry no such
/// marker and stay [`AppError::Collaborator`].
fn classify_query_error(message: &str, had_filter: bool) -> AppError {
    let lower = message.to_lowercase();
    let filter_rejection = lower.contains("where")
        || lower.contains("invalid")
        || lower.contains("422")
        || lower.contains("400");
    if had_filter && filter_rejection {
        AppError::InvalidFilter(message.to_string())
    } else {
        AppError::Collaborator(format!("query failed: {}", message))
    }
}
