// ===== LLM Agents =====
//
// Each generative step is a single-method capability trait so the
// pipeline can be exercised against deterministic fakes.

pub mod assistant;
pub mod composer;
pub mod extractor;
pub mod filter;

pub use assistant::{Assistant, AssistantReply};
pub use composer::{AnswerComposer, LlmAnswerComposer};
pub use extractor::{ChunkExtractor, LlmChunkExtractor, SourceDocument};
pub use filter::{FilterSynthesizer, LlmFilterSynthesizer};
