//! Core data type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw result returned by a search provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub published_date: Option<String>,
}

/// Kind of source a document came from, derived from its URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    ResearchPaper,
    Article,
}

impl SourceType {
    /// `arxiv.org` links and any URL mentioning "paper" count as research papers
    pub fn classify(url: &str) -> Self {
        if url.contains("arxiv.org") || url.to_lowercase().contains("paper") {
            SourceType::ResearchPaper
        } else {
            SourceType::Article
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::ResearchPaper => "research_paper",
            SourceType::Article => "article",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of accepted evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    /// Identity key for deduplication
    pub url: String,
    /// Body text, trimmed
    pub content: String,
    pub published_date: Option<String>,
    pub source_type: SourceType,
}

impl Document {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl AsRef<str>,
        published_date: Option<String>,
    ) -> Self {
        let url = url.into();
        Self {
            title: title.into(),
            source_type: SourceType::classify(&url),
            url,
            content: content.as_ref().trim().to_string(),
            published_date: published_date.filter(|d| !d.trim().is_empty()),
        }
    }

    /// Content length in characters
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }
}

impl From<SearchHit> for Document {
    fn from(hit: SearchHit) -> Self {
        Document::new(hit.title, hit.url, hit.content, hit.published_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_papers_by_url() {
        assert_eq!(
            SourceType::classify("https://arxiv.org/abs/2401.00001"),
            SourceType::ResearchPaper
        );
        assert_eq!(
            SourceType::classify("https://example.com/White-PAPER.pdf"),
            SourceType::ResearchPaper
        );
        assert_eq!(
            SourceType::classify("https://blog.example.com/post"),
            SourceType::Article
        );
    }

    #[test]
    fn hit_conversion_trims_content_and_drops_blank_dates() {
        let doc = Document::from(SearchHit {
            title: "T".to_string(),
            url: "https://example.com".to_string(),
            content: "  body text \n".to_string(),
            published_date: Some("  ".to_string()),
        });
        assert_eq!(doc.content, "body text");
        assert_eq!(doc.published_date, None);
        assert_eq!(doc.source_type, SourceType::Article);
    }

    #[test]
    fn missing_fields_decode_empty() {
        let hit: SearchHit = serde_json::from_str(r#"{"url": "u1"}"#).unwrap();
        assert_eq!(hit.url, "u1");
        assert!(hit.title.is_empty() && hit.content.is_empty());
        assert!(hit.published_date.is_none());
    }
}
