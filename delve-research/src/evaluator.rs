//! Progress evaluation against the plan

use crate::prompts::{evaluation_prompt, PLANNER_SYSTEM};
use crate::structured::{parse_or_default, parse_structured};
use crate::types::{ProgressRecord, ResearchPlan};
use delve_core::{DelveResult, Generator};
use std::sync::Arc;
use tracing::debug;

/// Judges per-category coverage; fails closed on malformed output
pub struct ProgressEvaluator {
    generator: Arc<dyn Generator>,
}

impl ProgressEvaluator {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    pub async fn evaluate(
        &self,
        plan: &ResearchPlan,
        evidence: &[&str],
    ) -> DelveResult<ProgressRecord> {
        let response = self
            .generator
            .generate(&evaluation_prompt(plan, evidence), PLANNER_SYSTEM)
            .await?;

        let record = parse_or_default(
            &response,
            "progress_record",
            parse_structured::<ProgressRecord>,
            ProgressRecord::all_false,
        );

        debug!(
            core_concepts = record.core_concepts,
            key_questions = record.key_questions,
            information_requirements = record.information_requirements,
            evidence_documents = evidence.len(),
            "Progress evaluated"
        );
        Ok(record)
    }
}
