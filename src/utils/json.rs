//! JSON extraction from raw LLM output.
//!
//! Models are asked to return bare JSON but routinely wrap it in prose or
//! markdown code fences. This utility is the single place that strips that
//! wrapping; both the ingestion step and the filter-synthesis step go
//! through it.

use crate::types::{AppError, Result};

/// Extract a single JSON object from raw collaborator output.
///
/// Strips surrounding whitespace, removes one optional leading fenced-code
/// marker (with or without a language tag) and one optional trailing
/// marker, then parses the substring between the first `{` and the last
/// `}` (inclusive).
///
/// # Errors
///
/// Returns [`AppError::NoJsonFound`] when no `{`/`}` pair is present and
/// [`AppError::JsonParse`] when the extracted substring is not valid JSON.
pub fn extract_json(raw: &str) -> Result<serde_json::Value> {
    let mut text = raw.trim();

    // One leading ``` or ```lang marker, one trailing ``` marker.
    if let Some(rest) = text.strip_prefix("```") {
        let after_tag = match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => rest,
        };
        text = after_tag;
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    let start = text.find('{').ok_or(AppError::NoJsonFound)?;
    let end = text.rfind('}').ok_or(AppError::NoJsonFound)?;
    if end < start {
        return Err(AppError::NoJsonFound);
    }

    serde_json::from_str(&text[start..=end]).map_err(|e| AppError::JsonParse(e.to_string()))
}
