//! Research loop controller
//!
//! `PLANNING -> EVALUATING -> STRATEGIZING -> SEARCHING -> (EVALUATING | DONE)`, with
//! `ABORTED` on any capability failure. One controller serves exactly one query;
//! every call is awaited before the next is issued, and the only cancellation
//! point is the budget check in front of each search.

use crate::evaluator::ProgressEvaluator;
use crate::evidence::EvidenceStore;
use crate::planner::ResearchPlanner;
use crate::queue::WorkQueue;
use crate::strategy::{DepthHeuristic, QueryStrategist};
use crate::types::{
    CompletionStats, ProgressRecord, ResearchItem, ResearchOutcome, ResearchPhase,
    TerminationReason,
};
use crate::{ResearchError, ResearchResult};
use delve_core::{
    log_operation_start, log_operation_success, validation_error, BudgetConfig, DelveError,
    Generator, SearchProvider,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

enum PassOutcome {
    Continue,
    BudgetExhausted,
    AllItemsCapped,
}

/// Bounded driver for one query
pub struct ResearchController {
    planner: ResearchPlanner,
    evaluator: ProgressEvaluator,
    strategist: QueryStrategist,
    search: Arc<dyn SearchProvider>,
    depth: DepthHeuristic,
    budget: BudgetConfig,
    evidence: EvidenceStore,
    attempts: HashMap<ResearchItem, usize>,
    search_count: usize,
    evaluations: usize,
    phase: ResearchPhase,
    phases: Vec<ResearchPhase>,
}

impl ResearchController {
    pub fn new(
        generator: Arc<dyn Generator>,
        search: Arc<dyn SearchProvider>,
        budget: BudgetConfig,
    ) -> Self {
        Self {
            planner: ResearchPlanner::new(generator.clone()),
            evaluator: ProgressEvaluator::new(generator.clone()),
            strategist: QueryStrategist::new(generator, budget.max_queries_per_item),
            search,
            depth: DepthHeuristic::from(&budget),
            budget,
            evidence: EvidenceStore::new(),
            attempts: HashMap::new(),
            search_count: 0,
            evaluations: 0,
            phase: ResearchPhase::Planning,
            phases: vec![ResearchPhase::Planning],
        }
    }

    /// Run the loop to completion; the controller is consumed
    pub async fn run(mut self, query: &str) -> ResearchResult<ResearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(
                validation_error!("query must not be empty", "query", "research_controller").into(),
            );
        }

        log_operation_start!("research_loop", query = %query);

        let planned = self.planner.plan(query).await;
        let plan = match planned {
            Ok(plan) => plan,
            Err(e) => return Err(self.abort(e)),
        };

        let (termination, progress) = loop {
            self.enter(ResearchPhase::Evaluating);
            let evaluation = {
                let contents = self.evidence.contents();
                self.evaluator.evaluate(&plan, &contents).await
            };
            let progress: ProgressRecord = match evaluation {
                Ok(record) => record,
                Err(e) => return Err(self.abort(e)),
            };
            self.evaluations += 1;

            if progress.is_complete() {
                info!("Research complete - all aspects covered");
                break (TerminationReason::Complete, progress);
            }

            let queue = WorkQueue::build(&plan, &progress, self.evidence.documents(), &self.depth);
            if queue.is_empty() {
                info!("No remaining research items after depth filtering");
                break (TerminationReason::NoRemainingItems, progress);
            }
            debug!(remaining_items = queue.len(), "Starting research pass");

            match self.run_pass(queue).await? {
                PassOutcome::Continue => {}
                PassOutcome::BudgetExhausted => {
                    info!(
                        "Reached maximum total searches ({})",
                        self.budget.max_searches_total
                    );
                    break (TerminationReason::BudgetExhausted, progress);
                }
                PassOutcome::AllItemsCapped => {
                    info!("Every remaining item hit its attempt limit");
                    break (TerminationReason::AttemptsExhausted, progress);
                }
            }
        };

        self.enter(ResearchPhase::Done);

        let stats = CompletionStats {
            total_searches: self.search_count,
            unique_sources: self.evidence.unique_sources(),
            research_coverage: progress,
            evaluations: self.evaluations,
            coverage_is_stale: termination == TerminationReason::BudgetExhausted,
        };

        log_operation_success!(
            "research_loop",
            total_searches = stats.total_searches,
            unique_sources = stats.unique_sources,
            termination = ?termination
        );

        Ok(ResearchOutcome {
            query: query.to_string(),
            plan,
            evidence: self.evidence.into_documents(),
            stats,
            termination,
            phases: self.phases,
        })
    }

    fn budget_exhausted(&self) -> bool {
        self.search_count >= self.budget.max_searches_total
    }

    async fn run_pass(&mut self, queue: WorkQueue) -> ResearchResult<PassOutcome> {
        let mut worked = false;

        for item in queue {
            if self.budget_exhausted() {
                return Ok(PassOutcome::BudgetExhausted);
            }

            let attempts = self.attempts.entry(item.clone()).or_insert(0);
            if *attempts >= self.budget.max_attempts_per_item {
                info!("Reached maximum attempts for {}", item);
                continue;
            }
            *attempts += 1;
            worked = true;

            info!("Researching {}: {}", item.category, item.text);
            self.enter(ResearchPhase::Strategizing);
            let strategized = self.strategist.strategize(&item, &self.evidence).await;
            let queries = match strategized {
                Ok(queries) => queries,
                Err(e) => return Err(self.abort(e)),
            };

            self.enter(ResearchPhase::Searching);
            self.search_item(&item, &queries).await?;
        }

        if self.budget_exhausted() {
            Ok(PassOutcome::BudgetExhausted)
        } else if !worked {
            Ok(PassOutcome::AllItemsCapped)
        } else {
            Ok(PassOutcome::Continue)
        }
    }

    async fn search_item(&mut self, item: &ResearchItem, queries: &[String]) -> ResearchResult<()> {
        let tokens = item.tokens();
        let mut accepted_chars: Vec<usize> = Vec::new();

        for query in queries {
            let query = query.trim();
            if query.is_empty() {
                continue;
            }
            if self.budget_exhausted() {
                return Ok(());
            }

            info!("Searching for: {}", query);
            let searched = self.search.search(query).await;
            let hits = match searched {
                Ok(hits) => hits,
                Err(e) => return Err(self.abort(e)),
            };
            self.search_count += 1;

            for hit in hits {
                let url = hit.url.clone();
                match self
                    .evidence
                    .admit(hit, &tokens, self.budget.min_content_chars)
                {
                    Ok(document) => accepted_chars.push(document.content_chars()),
                    Err(rejection) => debug!(url = %url, ?rejection, "Search result discarded"),
                }
            }

            if accepted_chars.len() >= self.budget.min_results_per_item
                && accepted_chars
                    .iter()
                    .all(|chars| *chars > self.budget.detailed_content_chars)
            {
                debug!(item = %item, "Enough detailed results for item");
                break;
            }
        }

        Ok(())
    }

    fn enter(&mut self, phase: ResearchPhase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "Research phase transition");
            self.phase = phase;
            self.phases.push(phase);
        }
    }

    fn abort(&mut self, error: DelveError) -> ResearchError {
        let phase = self.phase;
        warn!(phase = %phase, "Research run aborted");
        error.log();
        self.enter(ResearchPhase::Aborted);
        ResearchError::Aborted {
            phase,
            source: error,
        }
    }
}
