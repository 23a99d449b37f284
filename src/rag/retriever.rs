//! Retrieval orchestration: filter synthesis, filtered search with
//! over-fetch, client-side rerank, truncation.

use std::sync::Arc;

use tracing::{debug, info};

use crate::agents::filter::FilterSynthesizer;
use crate::store::filter::FilterExpression;
use crate::store::vectorstore::VectorStore;
use crate::types::Result;
use crate::utils::json::extract_json;

/// Default multiplier applied to the requested count before the filtered
/// search. A narrow filter can leave too few usable candidates otherwise.
pub const DEFAULT_OVER_FETCH_FACTOR: usize = 3;

/// Sequences the retrieval pipeline for one question.
pub struct Retriever {
    synthesizer: Arc<dyn FilterSynthesizer>,
    store: Arc<dyn VectorStore>,
    over_fetch_factor: usize,
}

impl Retriever {
    pub fn new(synthesizer: Arc<dyn FilterSynthesizer>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            synthesizer,
            store,
            over_fetch_factor: DEFAULT_OVER_FETCH_FACTOR,
        }
    }

    pub fn with_over_fetch_factor(mut self, factor: usize) -> Self {
        self.over_fetch_factor = factor.max(1);
        self
    }

    /// Retrieve up to `n_results` document strings for `question`.
    ///
    /// Returns the documents in ascending distance order together with the
    /// filter that was applied, for diagnostics. An empty synthesized
    /// filter (`{}`) means no filtering, never "match nothing".
    ///
    /// # Errors
    ///
    /// Propagates [`AppError::NoJsonFound`]/[`AppError::JsonParse`] when
    /// the synthesizer output contains no usable JSON, and the store's
    /// [`AppError::InvalidFilter`] when the store rejects the filter.
    ///
    /// [`AppError::NoJsonFound`]: crate::types::AppError::NoJsonFound
    /// [`AppError::JsonParse`]: crate::types::AppError::JsonParse
    /// [`AppError::InvalidFilter`]: crate::types::AppError::InvalidFilter
    pub async fn retrieve(
        &self,
        collection: &str,
        question: &str,
        n_results: usize,
    ) -> Result<(Vec<String>, Option<FilterExpression>)> {
        let raw = self.synthesizer.synthesize(question).await?;
        let filter_json = extract_json(&raw)?;

        let filter = match filter_json.as_object() {
            Some(obj) if obj.is_empty() => None,
            _ => Some(FilterExpression::from_value(&filter_json)?),
        };
        debug!(
            filter = %filter.as_ref().map(ToString::to_string).unwrap_or_else(|| "none".to_string()),
            "synthesized retrieval filter"
        );

        let candidates = self
            .store
            .similarity_search(
                collection,
                question,
                filter.as_ref(),
                n_results * self.over_fetch_factor,
            )
            .await?;

        let mut ranked = candidates;
        // The store already orders by distance; re-sorting keeps the
        // contract independent of the backend. Stable sort preserves the
        // store's order among equal distances.
        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        ranked.truncate(n_results);

        info!(
            collection,
            candidates = ranked.len(),
            filtered = filter.is_some(),
            "retrieval complete"
        );

        Ok((ranked.into_iter().map(|r| r.content).collect(), filter))
    }
}
