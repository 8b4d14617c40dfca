//! Append-only evidence store with URL deduplication

use delve_core::{Document, SearchHit};
use std::collections::HashSet;

/// Why a search hit was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingUrl,
    DuplicateUrl,
    TooShort,
    Irrelevant,
}

/// Accepted documents plus every URL seen so far
///
/// No two accepted documents share a URL, and nothing is ever removed.
#[derive(Debug, Default)]
pub struct EvidenceStore {
    documents: Vec<Document>,
    seen_urls: HashSet<String>,
}

impl EvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter one hit for an item and accept it when it passes
    ///
    /// `item_tokens` are the item's lowercase whitespace tokens; at least one must
    /// occur as a substring of the lowercased content.
    pub fn admit(
        &mut self,
        hit: SearchHit,
        item_tokens: &[String],
        min_content_chars: usize,
    ) -> Result<&Document, Rejection> {
        if hit.url.is_empty() {
            return Err(Rejection::MissingUrl);
        }
        if self.seen_urls.contains(&hit.url) {
            return Err(Rejection::DuplicateUrl);
        }

        let document = Document::from(hit);
        if document.content_chars() < min_content_chars {
            return Err(Rejection::TooShort);
        }

        let content = document.content.to_lowercase();
        if !item_tokens.iter().any(|token| content.contains(token.as_str())) {
            return Err(Rejection::Irrelevant);
        }

        self.seen_urls.insert(document.url.clone());
        self.documents.push(document);
        Ok(&self.documents[self.documents.len() - 1])
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Document bodies in acceptance order
    pub fn contents(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.content.as_str()).collect()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.title.as_str()).collect()
    }

    pub fn unique_sources(&self) -> usize {
        self.seen_urls.len()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}
