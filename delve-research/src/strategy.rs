//! Search strategy: queries for one research item, and the depth heuristic

use crate::evidence::EvidenceStore;
use crate::prompts::{strategy_prompt, STRATEGIST_SYSTEM};
use crate::structured::{parse_or_default, parse_structured, ParseFailure};
use crate::types::ResearchItem;
use delve_core::{BudgetConfig, DelveResult, Document, Generator};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Turns one unmet item into a small batch of search queries
pub struct QueryStrategist {
    generator: Arc<dyn Generator>,
    max_queries: usize,
}

impl QueryStrategist {
    pub fn new(generator: Arc<dyn Generator>, max_queries: usize) -> Self {
        Self {
            generator,
            max_queries,
        }
    }

    /// At most `max_queries` queries; the item text itself when the output is unusable
    pub async fn strategize(
        &self,
        item: &ResearchItem,
        evidence: &EvidenceStore,
    ) -> DelveResult<Vec<String>> {
        let titles = evidence.titles();
        let response = self
            .generator
            .generate(&strategy_prompt(item, &titles), STRATEGIST_SYSTEM)
            .await?;

        let max_queries = self.max_queries;
        let queries = parse_or_default(
            &response,
            "search_strategy",
            |raw| parse_queries(raw, max_queries),
            || vec![item.text.clone()],
        );

        debug!(item = %item, queries = ?queries, "Search strategy ready");
        Ok(queries)
    }
}

/// A JSON array of queries; non-string entries are stringified
pub fn parse_queries(raw: &str, max_queries: usize) -> Result<Vec<String>, ParseFailure> {
    let values: Vec<Value> = parse_structured(raw)?;
    if values.is_empty() {
        return Err(ParseFailure::Shape("query list was empty".to_string()));
    }

    Ok(values
        .into_iter()
        .take(max_queries)
        .map(|value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}

/// Token-overlap test deciding when an item has enough substantial evidence
///
/// Naive whitespace tokenization, no stop words; never a semantic measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthHeuristic {
    pub min_overlap: usize,
    pub min_chars: usize,
    pub min_documents: usize,
}

impl Default for DepthHeuristic {
    fn default() -> Self {
        Self::from(&BudgetConfig::default())
    }
}

impl From<&BudgetConfig> for DepthHeuristic {
    fn from(budget: &BudgetConfig) -> Self {
        Self {
            min_overlap: budget.depth_min_overlap,
            min_chars: budget.depth_min_chars,
            min_documents: budget.depth_min_documents,
        }
    }
}

fn token_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

impl DepthHeuristic {
    /// Shares `min_overlap` distinct words with the item and is longer than `min_chars`
    pub fn is_substantial(&self, item_text: &str, document: &Document) -> bool {
        if document.content_chars() <= self.min_chars {
            return false;
        }
        let item_tokens = token_set(item_text);
        let content_tokens = token_set(&document.content);
        item_tokens.intersection(&content_tokens).count() >= self.min_overlap
    }

    pub fn is_sufficiently_deep(&self, item_text: &str, documents: &[Document]) -> bool {
        documents
            .iter()
            .filter(|doc| self.is_substantial(item_text, doc))
            .take(self.min_documents)
            .count()
            >= self.min_documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_at_most_three_queries() {
        let queries = parse_queries(r#"["a", "b", "c", "d"]"#, 3).unwrap();
        assert_eq!(queries, vec!["a", "b", "c"]);
    }

    #[test]
    fn stringifies_non_string_entries() {
        let queries = parse_queries(r#"["rust", 42, {"q": "x"}]"#, 3).unwrap();
        assert_eq!(queries, vec!["rust", "42", r#"{"q":"x"}"#]);
    }

    #[test]
    fn rejects_objects_and_empty_lists() {
        assert!(parse_queries(r#"{"queries": ["a"]}"#, 3).is_err());
        assert!(parse_queries("[]", 3).is_err());
    }

    fn doc(content: &str) -> Document {
        Document::new("t", "https://example.com", content, None)
    }

    #[test]
    fn substantial_needs_two_distinct_shared_words() {
        let depth = DepthHeuristic::default();
        let filler = "z".repeat(300);
        assert!(depth.is_substantial("memory safety", &doc(&format!("Memory SAFETY {}", filler))));
        assert!(!depth.is_substantial("memory safety", &doc(&format!("memory memory {}", filler))));
    }
}
