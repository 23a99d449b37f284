//! One question-answering turn: retrieve then compose.

use std::sync::Arc;

use crate::agents::composer::AnswerComposer;
use crate::rag::retriever::Retriever;
use crate::store::filter::FilterExpression;
use crate::types::Result;

/// The assistant's reply, with the applied filter kept for diagnostics.
#[derive(Debug)]
pub struct AssistantReply {
    pub answer: String,
    pub applied_filter: Option<FilterExpression>,
    pub context_count: usize,
}

/// Wires retrieval and answer composition into a single turn.
pub struct Assistant {
    retriever: Retriever,
    composer: Arc<dyn AnswerComposer>,
    collection: String,
    top_k: usize,
}

impl Assistant {
    pub fn new(
        retriever: Retriever,
        composer: Arc<dyn AnswerComposer>,
        collection: String,
        top_k: usize,
    ) -> Self {
        Self {
            retriever,
            composer,
            collection,
            top_k,
        }
    }

    /// Answer one policy question.
    pub async fn answer(&self, question: &str) -> Result<AssistantReply> {
        let (contexts, applied_filter) = self
            .retriever
            .retrieve(&self.collection, question, self.top_k)
            .await?;

        let answer = self.composer.compose(question, &contexts).await?;

        Ok(AssistantReply {
            answer,
            applied_filter,
            context_count: contexts.len(),
        })
    }
}
