//! Shared fakes for integration tests: a deterministic embedder, canned
//! LLM agents, and a store wrapper that records search arguments.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use sage::agents::composer::AnswerComposer;
use sage::agents::extractor::{ChunkExtractor, SourceDocument};
use sage::agents::filter::FilterSynthesizer;
use sage::rag::embeddings::Embedder;
use sage::store::filter::FilterExpression;
use sage::store::vectorstore::{InMemoryVectorStore, VectorStore};
use sage::types::{
    Audience, Chunk, ChunkMetadata, DocumentType, RankedResult, Result, SpecificityLevel,
};

/// Deterministic embedder; identical texts embed identically.
pub struct HashEmbedder;

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0.0f32; 32];
                for (i, b) in t.bytes().enumerate() {
                    v[i % 32] += b as f32 / 255.0;
                }
                v
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "hash-embedder"
    }
}

/// Filter synthesizer returning a canned raw response.
pub struct StaticFilterSynthesizer {
    pub raw: String,
}

impl StaticFilterSynthesizer {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

#[async_trait]
impl FilterSynthesizer for StaticFilterSynthesizer {
    async fn synthesize(&self, _question: &str) -> Result<String> {
        Ok(self.raw.clone())
    }
}

/// Chunk extractor returning a canned raw response.
pub struct StaticChunkExtractor {
    pub raw: String,
}

impl StaticChunkExtractor {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

#[async_trait]
impl ChunkExtractor for StaticChunkExtractor {
    async fn extract(&self, _documents: &[SourceDocument]) -> Result<String> {
        Ok(self.raw.clone())
    }
}

/// Composer that echoes the question and how much context it received.
pub struct EchoComposer;

#[async_trait]
impl AnswerComposer for EchoComposer {
    async fn compose(&self, question: &str, contexts: &[String]) -> Result<String> {
        Ok(format!("[{} excerpts] {}", contexts.len(), question))
    }
}

/// Store wrapper recording the arguments of the last similarity search.
pub struct RecordingStore {
    inner: InMemoryVectorStore,
    pub last_limit: AtomicUsize,
    pub last_had_filter: AtomicBool,
    pub search_calls: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryVectorStore::new(Arc::new(HashEmbedder)),
            last_limit: AtomicUsize::new(0),
            last_had_filter: AtomicBool::new(false),
            search_calls: AtomicUsize::new(0),
        }
    }
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for RecordingStore {
    fn provider_name(&self) -> &'static str {
        "recording"
    }

    async fn create_collection(&self, name: &str) -> Result<()> {
        self.inner.create_collection(name).await
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.inner.delete_collection(name).await
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        self.inner.list_collections().await
    }

    async fn add_documents(&self, collection: &str, chunks: &[Chunk]) -> Result<Vec<String>> {
        self.inner.add_documents(collection, chunks).await
    }

    async fn similarity_search(
        &self,
        collection: &str,
        query: &str,
        filter: Option<&FilterExpression>,
        limit: usize,
    ) -> Result<Vec<RankedResult>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.last_limit.store(limit, Ordering::SeqCst);
        self.last_had_filter.store(filter.is_some(), Ordering::SeqCst);
        self.inner.similarity_search(collection, query, filter, limit).await
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        self.inner.count(collection).await
    }
}

/// A policy chunk with sensible defaults for tests.
pub fn policy_chunk(content: &str, authoritative_for_interns: bool) -> Chunk {
    Chunk {
        content: content.to_string(),
        metadata: ChunkMetadata {
            document_type: if authoritative_for_interns {
                DocumentType::InternFaq
            } else {
                DocumentType::Handbook
            },
            applies_to: if authoritative_for_interns {
                vec![Audience::Interns]
            } else {
                vec![Audience::AllEmployees]
            },
            policy_topic: "remote_work".to_string(),
            specificity_level: if authoritative_for_interns {
                SpecificityLevel::RoleSpecific
            } else {
                SpecificityLevel::General
            },
            is_role_specific_intern: authoritative_for_interns,
            is_authoritative_for_interns: authoritative_for_interns,
            supersedes_older_policies: false,
            conflict_resolution_note: false,
            document_version: "2024.0".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
            author_department: "People & Culture".to_string(),
        },
    }
}
