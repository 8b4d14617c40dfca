//! Research planning: query to structured plan

use crate::prompts::{plan_prompt, PLANNER_SYSTEM};
use crate::structured::{parse_or_default, parse_structured};
use crate::types::ResearchPlan;
use delve_core::{DelveResult, Generator};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns a query into a [`ResearchPlan`]
pub struct ResearchPlanner {
    generator: Arc<dyn Generator>,
}

impl ResearchPlanner {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Generation errors propagate; unparseable output yields the degenerate plan
    pub async fn plan(&self, query: &str) -> DelveResult<ResearchPlan> {
        info!("Planning research for query: {}", query);

        let response = self
            .generator
            .generate(&plan_prompt(query), PLANNER_SYSTEM)
            .await?;

        let plan = parse_or_default(&response, "research_plan", parse_structured, || {
            ResearchPlan::degenerate(query)
        });

        debug!(
            core_concepts = plan.core_concepts.len(),
            key_questions = plan.key_questions.len(),
            information_requirements = plan.information_requirements.len(),
            "Research plan ready"
        );
        Ok(plan)
    }
}
