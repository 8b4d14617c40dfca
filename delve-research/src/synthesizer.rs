//! Report synthesis from the final plan and evidence

use crate::prompts::{report_prompt, REPORT_SYSTEM};
use crate::sources::{append_sources, collect_sources, SourceEntry};
use crate::types::{CompletionStats, ResearchPlan};
use delve_core::{DelveResult, Document, Generator};
use std::sync::Arc;
use tracing::info;

/// Narrative report with its sources section appended
#[derive(Debug, Clone)]
pub struct SynthesizedReport {
    pub markdown: String,
    pub sources: Vec<SourceEntry>,
}

/// Compiles the gathered evidence into the final report
pub struct ReportSynthesizer {
    generator: Arc<dyn Generator>,
}

impl ReportSynthesizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    pub async fn synthesize(
        &self,
        query: &str,
        plan: &ResearchPlan,
        documents: &[Document],
        stats: &CompletionStats,
    ) -> DelveResult<SynthesizedReport> {
        let (blocks, sources) = collect_sources(documents);
        info!(
            "Synthesizing report for query: {} from {} sources",
            query,
            sources.len()
        );

        let narrative = self
            .generator
            .generate(&report_prompt(query, plan, &blocks, stats), REPORT_SYSTEM)
            .await?;

        Ok(SynthesizedReport {
            markdown: append_sources(&narrative, &sources),
            sources,
        })
    }
}
