//! Evidence blocks for the synthesizer and the "Sources Cited" section

use delve_core::{Document, SourceType};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

const NO_DATE: &str = "Date not available";

/// One citable source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SourceEntry {
    pub title: String,
    pub url: String,
    /// Publication date, or `Date not available`
    pub date: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub source_type: SourceType,
}

impl SourceEntry {
    /// Blank or missing dates become `Date not available`
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        date: Option<&str>,
        source_type: SourceType,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            date: date
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(NO_DATE)
                .to_string(),
            source_type,
        }
    }
}

/// Evidence block as it appears in the report prompt
pub fn format_evidence_block(
    title: &str,
    url: &str,
    date: Option<&str>,
    content: &str,
    source_type: SourceType,
) -> String {
    format!(
        "### Source: {}\nURL: {}\nDate: {}\nType: {}\n\n**Key Content:**\n{}\n\n---",
        title,
        url,
        date.filter(|d| !d.is_empty()).unwrap_or("Not available"),
        source_type,
        content
    )
}

/// Evidence blocks and source entries for every citable document
///
/// Documents with an empty title or body are left out of both.
pub fn collect_sources(documents: &[Document]) -> (Vec<String>, Vec<SourceEntry>) {
    let mut blocks = Vec::new();
    let mut sources = Vec::new();

    for document in documents {
        let title = document.title.trim();
        let content = document.content.trim();
        if title.is_empty() || content.is_empty() {
            continue;
        }
        let url = document.url.trim();
        let date = document
            .published_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        blocks.push(format_evidence_block(
            title,
            url,
            date,
            content,
            document.source_type,
        ));
        sources.push(SourceEntry::new(title, url, date, document.source_type));
    }

    (blocks, sources)
}

fn push_subsection(section: &mut String, heading: &str, entries: &[&SourceEntry]) {
    if entries.is_empty() {
        return;
    }
    section.push_str(heading);
    for (idx, source) in entries.iter().enumerate() {
        section.push_str(&format!(
            "{}. [{}]({}) - {}\n",
            idx + 1,
            source.title,
            source.url,
            source.date
        ));
    }
}

/// Markdown "Sources Cited" block, papers first, numbering restarting per subsection
pub fn format_sources_section(sources: &[SourceEntry]) -> String {
    let mut section = String::from("\n\n## Sources Cited\n\n");

    if sources.is_empty() {
        section.push_str("No sources were found during the research phase.");
        return section;
    }

    let (papers, articles): (Vec<&SourceEntry>, Vec<&SourceEntry>) = sources
        .iter()
        .partition(|s| s.source_type == SourceType::ResearchPaper);

    push_subsection(&mut section, "\n### Research Papers\n", &papers);
    push_subsection(&mut section, "\n### Technical Articles & Resources\n", &articles);

    section.push('\n');
    section
}

/// Report text followed by a blank line and the sources section
pub fn append_sources(report: &str, sources: &[SourceEntry]) -> String {
    format!("{}\n\n{}", report, format_sources_section(sources))
}
