//! Filter synthesis: question text in, metadata filter JSON out.
//!
//! The synthesizer is prompted with the closed metadata schema and returns
//! the raw model text; parsing and the empty-object escape hatch live in
//! the retriever, so a fake synthesizer in tests can return any raw string.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::LLMClient;
use crate::types::Result;

/// Instructions for turning a policy question into a metadata `where` filter.
pub const FILTER_SYNTHESIS_PROMPT: &str = r#"You are the policy assistant's query filter extractor. Your only job is to analyze the user's question and return ONLY a valid metadata `where` filter that guarantees the most authoritative, role-specific documents are retrieved first, especially ensuring intern-specific rules win when the user is an intern.

Use EXACTLY these metadata fields and values (do not invent new ones):

- document_type: "handbook" | "policy_update" | "intern_faq"
- applies_to: containing any of: "all_employees", "full_time_employees", "interns", "contractors", "managers". (If multiple, comma-separated ex: "interns, contractors")
- policy_topic: string (e.g. "remote_work", "office_presence", "onboarding", etc.)
- specificity_level: "general" | "role_specific" | "department_specific"
- is_role_specific_intern: true | false
- is_authoritative_for_interns: true | false
- supersedes_older_policies: true | false
- conflict_resolution_note: true | false

### Detection Rules (strict)
- If user mentions: intern, internship, "new intern", "just joined as intern", "summer intern", "co-op", "entry-level" -> user is intern
- Remote work keywords ("work from home", "remote", "wfh", "office", "in-office", "hybrid") -> topic is remote_work or office_presence

### Priority Logic
1. If user is an intern -> MUST include is_authoritative_for_interns = true (this alone beats everything)
2. Always boost role-specific over general
3. For interns: intern_faq chunks must win even if cosine similarity favors older docs

### Output Format - ONLY this JSON, nothing else
Return exactly one of these structures:

# For intern asking about remote work
{
"$or": [
    { "is_authoritative_for_interns": true },
    { "is_role_specific_intern": true },
    { "applies_to": "interns" }
]
}

# For full-time employee asking about remote work
{
"$or": [
    { "document_type": "policy_update" },
    { "supersedes_older_policies": true },
    { "applies_to": { "$in": ["all_employees", "full_time_employees"] } }
]
}

# Broad fallback (unknown role)
{
"policy_topic": { "$in": ["remote_work", "office_presence"] }
}

# No useful constraint at all
{}

Return ONLY the raw JSON filter object. No variable name, no markdown, no explanation, no extra text."#;

const FILTER_SYSTEM_PROMPT: &str =
    "You are an expert at generating database query filters based on user questions.";

/// Produces the raw filter text for a question.
#[async_trait]
pub trait FilterSynthesizer: Send + Sync {
    /// Return the model's raw output; callers parse it.
    async fn synthesize(&self, question: &str) -> Result<String>;
}

/// Filter synthesizer backed by an [`LLMClient`].
pub struct LlmFilterSynthesizer {
    client: Arc<dyn LLMClient>,
}

impl LlmFilterSynthesizer {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FilterSynthesizer for LlmFilterSynthesizer {
    async fn synthesize(&self, question: &str) -> Result<String> {
        let prompt = format!(
            "{}\n\nuser_question: {}\n\nProvide only the JSON filter:",
            FILTER_SYNTHESIS_PROMPT, question
        );
        self.client
            .generate_with_system(FILTER_SYSTEM_PROMPT, &prompt)
            .await
    }
}
