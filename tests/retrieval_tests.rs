//! Retrieval pipeline integration tests against deterministic fakes.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{policy_chunk, EchoComposer, HashEmbedder, RecordingStore, StaticFilterSynthesizer};
use sage::agents::Assistant;
use sage::rag::Retriever;
use async_trait::async_trait;
use sage::store::filter::FilterExpression;
use sage::store::vectorstore::{InMemoryVectorStore, VectorStore};
use sage::types::{AppError, Chunk, RankedResult, Result};

const COLLECTION: &str = "company_policies";

const INTERN_FILTER_RAW: &str = r#"Sure! ```json
{"$or": [{"is_authoritative_for_interns": true}]}
```"#;

#[tokio::test]
async fn test_intern_filter_narrows_candidates() {
    let store = Arc::new(RecordingStore::new());
    store
        .add_documents(
            COLLECTION,
            &[
                policy_chunk("Interns must be in the office 5 days a week.", true),
                policy_chunk("Employees may work remotely two days a week.", false),
            ],
        )
        .await
        .unwrap();

    let synthesizer = Arc::new(StaticFilterSynthesizer::new(INTERN_FILTER_RAW));
    let retriever = Retriever::new(synthesizer, store.clone());

    let (docs, filter) = retriever
        .retrieve(COLLECTION, "As an intern, can I work remotely?", 20)
        .await
        .unwrap();

    assert_eq!(docs.len(), 1);
    assert!(docs[0].contains("Interns must be in the office"));
    assert!(filter.is_some());
    assert!(store.last_had_filter.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_over_fetch_multiplies_requested_count() {
    let store = Arc::new(RecordingStore::new());
    store
        .add_documents(COLLECTION, &[policy_chunk("PTO accrues monthly.", false)])
        .await
        .unwrap();

    let synthesizer = Arc::new(StaticFilterSynthesizer::new("{}"));
    let retriever = Retriever::new(synthesizer, store.clone());

    retriever.retrieve(COLLECTION, "pto?", 2).await.unwrap();

    assert_eq!(store.last_limit.load(Ordering::SeqCst), 6);
    assert_eq!(store.search_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_filter_object_means_no_filter() {
    let store = Arc::new(RecordingStore::new());
    store
        .add_documents(
            COLLECTION,
            &[
                policy_chunk("Remote work is allowed.", false),
                policy_chunk("Interns follow the FAQ.", true),
            ],
        )
        .await
        .unwrap();

    let synthesizer = Arc::new(StaticFilterSynthesizer::new("{}"));
    let retriever = Retriever::new(synthesizer, store.clone());

    let (docs, filter) = retriever
        .retrieve(COLLECTION, "remote work?", 10)
        .await
        .unwrap();

    // Both chunks survive; nothing was suppressed by a no-match predicate.
    assert_eq!(docs.len(), 2);
    assert!(filter.is_none());
    assert!(!store.last_had_filter.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_truncates_to_requested_count() {
    let store = Arc::new(InMemoryVectorStore::new(Arc::new(HashEmbedder)));
    let chunks: Vec<_> = (0..5)
        .map(|i| policy_chunk(&format!("Policy section number {}.", i), false))
        .collect();
    store.add_documents(COLLECTION, &chunks).await.unwrap();

    let synthesizer = Arc::new(StaticFilterSynthesizer::new("{}"));
    let retriever = Retriever::new(synthesizer, store);

    let (docs, _) = retriever.retrieve(COLLECTION, "policy?", 2).await.unwrap();
    assert_eq!(docs.len(), 2);
}

#[tokio::test]
async fn test_filter_matching_nothing_returns_empty() {
    let store = Arc::new(RecordingStore::new());
    store
        .add_documents(COLLECTION, &[policy_chunk("General policy.", false)])
        .await
        .unwrap();

    let synthesizer = Arc::new(StaticFilterSynthesizer::new(
        r#"{"policy_topic": "nonexistent_topic"}"#,
    ));
    let retriever = Retriever::new(synthesizer, store);

    let (docs, filter) = retriever.retrieve(COLLECTION, "anything?", 5).await.unwrap();
    assert!(docs.is_empty());
    assert!(filter.is_some());
}

#[tokio::test]
async fn test_synthesizer_output_without_json_fails() {
    let store = Arc::new(RecordingStore::new());
    store
        .add_documents(COLLECTION, &[policy_chunk("Some policy.", false)])
        .await
        .unwrap();

    let synthesizer = Arc::new(StaticFilterSynthesizer::new(
        "I could not determine a filter for this question.",
    ));
    let retriever = Retriever::new(synthesizer, store.clone());

    let result = retriever.retrieve(COLLECTION, "hm?", 5).await;
    assert!(matches!(result, Err(AppError::NoJsonFound)));
    // The search must not run when filter extraction fails.
    assert_eq!(store.search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_synthesizer_output_with_broken_json_fails() {
    let store = Arc::new(RecordingStore::new());
    let synthesizer = Arc::new(StaticFilterSynthesizer::new(r#"{"policy_topic": }"#));
    let retriever = Retriever::new(synthesizer, store);

    let result = retriever.retrieve(COLLECTION, "hm?", 5).await;
    assert!(matches!(result, Err(AppError::JsonParse(_))));
}

#[tokio::test]
async fn test_custom_over_fetch_factor() {
    let store = Arc::new(RecordingStore::new());
    store
        .add_documents(COLLECTION, &[policy_chunk("Policy.", false)])
        .await
        .unwrap();

    let synthesizer = Arc::new(StaticFilterSynthesizer::new("{}"));
    let retriever = Retriever::new(synthesizer, store.clone()).with_over_fetch_factor(5);

    retriever.retrieve(COLLECTION, "q?", 4).await.unwrap();
    assert_eq!(store.last_limit.load(Ordering::SeqCst), 20);
}

/// Store returning candidates out of distance order, with a tie.
struct OutOfOrderStore;

#[async_trait]
impl VectorStore for OutOfOrderStore {
    fn provider_name(&self) -> &'static str {
        "out-of-order"
    }

    async fn create_collection(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    async fn delete_collection(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn add_documents(&self, _collection: &str, _chunks: &[Chunk]) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn similarity_search(
        &self,
        _collection: &str,
        _query: &str,
        _filter: Option<&FilterExpression>,
        _limit: usize,
    ) -> Result<Vec<RankedResult>> {
        let metadata = policy_chunk("placeholder", false).metadata;
        let ranked = |content: &str, distance: f32| RankedResult {
            content: content.to_string(),
            metadata: metadata.clone(),
            distance,
        };
        Ok(vec![
            ranked("far", 0.9),
            ranked("tie-first", 0.5),
            ranked("near", 0.1),
            ranked("tie-second", 0.5),
        ])
    }

    async fn count(&self, _collection: &str) -> Result<usize> {
        Ok(4)
    }
}

#[tokio::test]
async fn test_rerank_sorts_ascending_and_keeps_tie_order() {
    let synthesizer = Arc::new(StaticFilterSynthesizer::new("{}"));
    let retriever = Retriever::new(synthesizer, Arc::new(OutOfOrderStore));

    let (docs, _) = retriever.retrieve(COLLECTION, "anything?", 4).await.unwrap();

    // Ascending by distance; the store's order is preserved for the tie.
    assert_eq!(docs, ["near", "tie-first", "tie-second", "far"]);
}

#[tokio::test]
async fn test_assistant_turn_composes_over_retrieved_context() {
    let store = Arc::new(RecordingStore::new());
    store
        .add_documents(
            COLLECTION,
            &[policy_chunk("Interns must be in the office 5 days a week.", true)],
        )
        .await
        .unwrap();

    let synthesizer = Arc::new(StaticFilterSynthesizer::new(INTERN_FILTER_RAW));
    let retriever = Retriever::new(synthesizer, store);
    let assistant = Assistant::new(
        retriever,
        Arc::new(EchoComposer),
        COLLECTION.to_string(),
        20,
    );

    let reply = assistant
        .answer("As an intern, can I work remotely?")
        .await
        .unwrap();

    assert_eq!(reply.context_count, 1);
    assert!(reply.answer.starts_with("[1 excerpts]"));
    assert!(reply.applied_filter.is_some());
}
