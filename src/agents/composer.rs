//! Answer composition over retrieved policy chunks.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::LLMClient;
use crate::types::Result;

/// Reasoning and formatting rules for the final answer.
pub const ANSWER_COMPOSITION_PROMPT: &str = r#"You are a company policy assistant, an expert system designed to answer employee questions accurately by resolving conflicting or outdated company policies.

### Core Reasoning Rules (MUST follow in this exact order):
1. **Specificity overrides generality**: A rule that explicitly mentions a role (e.g., "interns", "managers", "new hires") ALWAYS takes precedence over a general rule that applies to "all employees".
2. **Role-targeted documents supersede others**: Documents titled or tagged as applying to interns, contractors, or specific departments override handbooks or company-wide policies when the question is asked by someone in that group.
3. **Most restrictive rule wins when roles are mentioned**: If a document explicitly prohibits something for a specific role (e.g., "interns are required to be in the office 5 days a week"), that prohibition is final, even if other documents grant permissions to other roles.
4. **Date/recency is secondary**: Only consider recency if two documents apply to the exact same role/group and have conflicting rules. Role-specific documents are always more authoritative than dated updates unless the update explicitly mentions that role.

### User Context Extraction:
- Always identify the employee's role from the question (e.g., "intern", "full-time employee", "manager").
- If the role is explicitly stated, prioritize any document that mentions that exact role.

### Answer Format (STRICT):
- First, state the final answer clearly in 1-2 sentences.
- Then explain your reasoning step-by-step, citing the document names and quoting the exact relevant sentences.
- Finally, list the source documents in order of authority (most authoritative first).

Never hallucinate policies. Base your answer only on the retrieved policy excerpts provided below."#;

/// Composes the final answer from the question and retrieved context.
#[async_trait]
pub trait AnswerComposer: Send + Sync {
    async fn compose(&self, question: &str, contexts: &[String]) -> Result<String>;
}

/// Answer composer backed by an [`LLMClient`].
pub struct LlmAnswerComposer {
    client: Arc<dyn LLMClient>,
}

impl LlmAnswerComposer {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnswerComposer for LlmAnswerComposer {
    async fn compose(&self, question: &str, contexts: &[String]) -> Result<String> {
        let mut prompt = String::from("Retrieved policy excerpts:\n");
        if contexts.is_empty() {
            prompt.push_str("(none found)\n");
        }
        for (i, context) in contexts.iter().enumerate() {
            prompt.push_str(&format!("\n--- Excerpt {} ---\n{}\n", i + 1, context));
        }
        prompt.push_str(&format!("\nQuestion: {}", question));

        self.client
            .generate_with_system(ANSWER_COMPOSITION_PROMPT, &prompt)
            .await
    }
}
