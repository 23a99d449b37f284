// ===== LLM Providers =====

pub mod client;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use client::{LLMClient, Provider};
