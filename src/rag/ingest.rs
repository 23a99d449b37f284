//! Ingestion: LLM-chunked documents into the vector store.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::agents::extractor::{ChunkExtractor, SourceDocument};
use crate::store::vectorstore::VectorStore;
use crate::types::{AppError, Chunk, Result};
use crate::utils::json::extract_json;

/// The extractor's expected output shape.
#[derive(Debug, Deserialize)]
struct ChunkBatch {
    sections: Vec<Chunk>,
}

/// Outcome of one ingestion run.
#[derive(Debug)]
pub struct IngestReport {
    pub ids: Vec<String>,
    pub chunk_count: usize,
}

/// Drives the chunk-extract-validate-store pipeline.
pub struct Ingestor {
    extractor: Arc<dyn ChunkExtractor>,
    store: Arc<dyn VectorStore>,
}

impl Ingestor {
    pub fn new(extractor: Arc<dyn ChunkExtractor>, store: Arc<dyn VectorStore>) -> Self {
        Self { extractor, store }
    }

    /// Chunk the documents in one extractor call and store the batch.
    ///
    /// The whole batch is stored or none of it is. When `dump_path` is
    /// set, the validated chunk JSON is written there for inspection.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::IngestionSchema`] when the extractor output does
    /// not match the expected `{"sections": [...]}` shape or a chunk's
    /// metadata fails validation.
    pub async fn ingest(
        &self,
        collection: &str,
        documents: &[SourceDocument],
        dump_path: Option<&Path>,
    ) -> Result<IngestReport> {
        if documents.is_empty() {
            return Err(AppError::InvalidInput(
                "no documents provided for ingestion".to_string(),
            ));
        }

        let raw = self.extractor.extract(documents).await?;
        let value = extract_json(&raw)?;

        let batch: ChunkBatch = serde_json::from_value(value).map_err(|e| {
            AppError::IngestionSchema(format!("extractor output does not match schema: {}", e))
        })?;
        if batch.sections.is_empty() {
            return Err(AppError::IngestionSchema(
                "extractor returned no sections".to_string(),
            ));
        }

        if let Some(path) = dump_path {
            let pretty = serde_json::to_string_pretty(&serde_json::json!({
                "sections": batch.sections
            }))
            .map_err(|e| AppError::JsonParse(e.to_string()))?;
            std::fs::write(path, pretty)?;
        }

        let ids = self.store.add_documents(collection, &batch.sections).await?;
        info!(
            collection,
            chunks = batch.sections.len(),
            "ingestion complete"
        );

        Ok(IngestReport {
            chunk_count: batch.sections.len(),
            ids,
        })
    }
}
