//! LLM-driven document chunking.
//!
//! All source documents for one ingestion run are bundled into a single
//! request so the model can tag cross-document relationships (which update
//! supersedes which handbook section). The extractor returns raw model
//! text; schema validation happens in the ingestor.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::LLMClient;
use crate::types::Result;

/// Instructions for splitting policy documents into tagged chunks.
pub const CHUNK_EXTRACTION_PROMPT: &str = r#"You are an expert policy document parser. Your only job is to read the provided company documents and split them into logical, self-contained sections/chunks with rich metadata attached, suited for a conflict-aware retrieval system.

### Core Splitting Rules
- Use headings, sub-headings, FAQs, bullet sections, policy blocks, and natural paragraph groups as boundaries.
- Never break a single policy rule or sentence across chunks.
- Target chunk size: 150-450 words (~300 ideal). Merge tiny sections; split very long ones intelligently.
- Preserve all original formatting clues (e.g., quotes, bold policy statements).
- Combine all the attached files and generate a single json exactly in the format below.

### Exact Output Format (STRICT - return ONLY this JSON structure)
{
"sections": [
    {
    "content": "Full raw text of this section (clean, no markdown artifacts)",
    "metadata": {
        "document_version": "2024.0",
        "effective_date": "2024-06-01",
        "author_department": "People & Culture",
        "document_type": "intern_faq",
        "applies_to": "interns, contractors",
        "policy_topic": "office_presence",
        "specificity_level": "role_specific",
        "is_role_specific_intern": true,
        "is_authoritative_for_interns": true,
        "supersedes_older_policies": false,
        "conflict_resolution_note": true
    }
    },
    { ... next section ... }
]
}

Field values:
- document_type: "handbook" | "policy_update" | "intern_faq"
- applies_to: comma-separated subset of "all_employees", "full_time_employees", "interns", "contractors", "managers"
- specificity_level: "general" | "role_specific" | "department_specific"
- effective_date: ISO date (YYYY-MM-DD)

### Mandatory Tagging Logic
- Every chunk from an intern FAQ document -> is_authoritative_for_interns = true
- Any chunk that explicitly mentions "intern(s)", "internship", "entry-level participant" ->
  applies_to includes "interns", is_role_specific_intern = true, specificity_level = "role_specific"
- Chunks containing phrases like "in case of conflict", "authoritative source", "refer to this document" -> conflict_resolution_note = true
- Policy-update chunks that update or restrict earlier rules -> supersedes_older_policies = true

### Final Instruction
Return ONLY the valid JSON object above. No explanations, no markdown, no extra text whatsoever."#;

/// A named source document queued for ingestion.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub text: String,
}

/// Splits source documents into tagged chunks.
#[async_trait]
pub trait ChunkExtractor: Send + Sync {
    /// Return the model's raw output for the whole document batch.
    async fn extract(&self, documents: &[SourceDocument]) -> Result<String>;
}

/// Chunk extractor backed by an [`LLMClient`].
pub struct LlmChunkExtractor {
    client: Arc<dyn LLMClient>,
}

impl LlmChunkExtractor {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChunkExtractor for LlmChunkExtractor {
    async fn extract(&self, documents: &[SourceDocument]) -> Result<String> {
        let mut prompt = String::from(
            "Split the following company policy documents into meaningful chunks \
             with rich metadata as per the provided instructions.\n",
        );
        for doc in documents {
            prompt.push_str(&format!("\n===== {} =====\n{}\n", doc.name, doc.text));
        }
        self.client
            .generate_with_system(CHUNK_EXTRACTION_PROMPT, &prompt)
            .await
    }
}
