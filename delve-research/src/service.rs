//! Per-query research façade
//!
//! Builds a fresh controller for every query, runs the loop, then the
//! synthesizer. Nothing mutable is shared between queries.

use crate::engine::ResearchController;
use crate::sources::SourceEntry;
use crate::synthesizer::ReportSynthesizer;
use crate::types::{CompletionStats, ResearchPlan, TerminationReason};
use crate::ResearchResult;
use delve_core::logging::performance::measure_async;
use delve_core::{BudgetConfig, DelveConfig, DelveResult, Generator, SearchProvider};
use delve_llm::LlmGenerator;
use delve_search::TavilyClient;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Fixed report returned in test mode; no capability is called
pub const TEST_MODE_REPORT: &str = "# Test Mode Response

## Overview
This is a sample report generated in test mode without using API credits.

## Key Findings
1. Test finding one
2. Test finding two

## Test Results
Sample analysis content...
";

/// Finished report plus what the loop did to produce it
#[derive(Debug, Clone, Serialize)]
pub struct ResearchReport {
    pub query: String,
    /// Narrative with the sources section appended
    pub markdown: String,
    pub plan: Option<ResearchPlan>,
    pub stats: CompletionStats,
    pub termination: Option<TerminationReason>,
    pub sources: Vec<SourceEntry>,
    pub test_mode: bool,
}

enum Backend {
    Live {
        generator: Arc<dyn Generator>,
        search: Arc<dyn SearchProvider>,
    },
    TestMode,
}

pub struct ResearchService {
    backend: Backend,
    budget: BudgetConfig,
}

impl ResearchService {
    pub fn new(
        generator: Arc<dyn Generator>,
        search: Arc<dyn SearchProvider>,
        budget: BudgetConfig,
    ) -> Self {
        Self {
            backend: Backend::Live { generator, search },
            budget,
        }
    }

    /// Service that answers every query with [`TEST_MODE_REPORT`]
    pub fn test_mode() -> Self {
        Self {
            backend: Backend::TestMode,
            budget: BudgetConfig::default(),
        }
    }

    /// Wire the configured LLM provider and Tavily; missing credentials fail here
    pub async fn from_config(config: &DelveConfig) -> DelveResult<Self> {
        config.validate()?;
        let search = TavilyClient::from_search_config(&config.search)?;
        let generator = LlmGenerator::new(&config.llm).await?;

        Ok(Self::new(
            Arc::new(generator),
            Arc::new(search),
            config.research.clone(),
        ))
    }

    pub fn is_test_mode(&self) -> bool {
        matches!(self.backend, Backend::TestMode)
    }

    pub async fn research(&self, query: &str) -> ResearchResult<ResearchReport> {
        let (generator, search) = match &self.backend {
            Backend::TestMode => {
                info!("Test mode: returning sample report for query: {}", query);
                return Ok(ResearchReport {
                    query: query.to_string(),
                    markdown: TEST_MODE_REPORT.to_string(),
                    plan: None,
                    stats: CompletionStats::default(),
                    termination: None,
                    sources: Vec::new(),
                    test_mode: true,
                });
            }
            Backend::Live { generator, search } => (generator.clone(), search.clone()),
        };

        let controller = ResearchController::new(generator.clone(), search, self.budget.clone());
        let outcome = measure_async("research_loop", controller.run(query)).await?;

        info!(
            "Research stats: {}",
            serde_json::to_string(&outcome.stats).unwrap_or_default()
        );

        let synthesizer = ReportSynthesizer::new(generator);
        let report = measure_async(
            "report_synthesis",
            synthesizer.synthesize(
                &outcome.query,
                &outcome.plan,
                &outcome.evidence,
                &outcome.stats,
            ),
        )
        .await?;

        Ok(ResearchReport {
            query: outcome.query,
            markdown: report.markdown,
            plan: Some(outcome.plan),
            stats: outcome.stats,
            termination: Some(outcome.termination),
            sources: report.sources,
            test_mode: false,
        })
    }
}
