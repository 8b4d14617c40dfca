//! Parsing structured model output into typed values
//!
//! Models wrap JSON in markdown fences or surround it with prose. Every
//! caller supplies a safe default, so a parse failure is logged and never
//! surfaced.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::warn;

static FENCED_BLOCK: OnceLock<Regex> = OnceLock::new();

/// Why a model response could not be used
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("response contained no JSON")]
    Empty,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Shape(String),
}

/// Strip markdown fences and surrounding whitespace
pub fn clean_model_output(raw: &str) -> &str {
    let fenced = FENCED_BLOCK
        .get_or_init(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").unwrap());
    match fenced.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => raw.trim(),
    }
}

/// Parse `raw` as `T`, falling back to the outermost JSON object or array in the text
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, ParseFailure> {
    let cleaned = clean_model_output(raw);
    if cleaned.is_empty() {
        return Err(ParseFailure::Empty);
    }

    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(first_error) => match embedded_json(cleaned) {
            Some(candidate) if candidate != cleaned => Ok(serde_json::from_str(candidate)?),
            _ => Err(first_error.into()),
        },
    }
}

/// Parse with `parse`, or log and return `default()`
pub fn parse_or_default<T, P, D>(raw: &str, what: &str, parse: P, default: D) -> T
where
    P: FnOnce(&str) -> Result<T, ParseFailure>,
    D: FnOnce() -> T,
{
    match parse(raw) {
        Ok(value) => value,
        Err(failure) => {
            warn!(
                target: "delve_research::structured",
                what,
                error = %failure,
                response_chars = raw.len(),
                "Could not parse model output, using fallback"
            );
            default()
        }
    }
}

fn embedded_json(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let closing = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(closing)?;
    (end > start).then(|| &text[start..=end])
}
