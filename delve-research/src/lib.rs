//! Delve Research - the iterative research-sufficiency loop
//!
//! A query becomes a structured plan; the controller then alternates between
//! judging coverage and searching for unmet items until the plan is covered,
//! the search budget runs out, or every item hits its attempt cap. The
//! synthesizer turns the final evidence into a cited report.

pub mod engine;
pub mod evaluator;
pub mod evidence;
pub mod planner;
pub mod prompts;
pub mod queue;
pub mod service;
pub mod sources;
pub mod strategy;
pub mod structured;
pub mod synthesizer;
pub mod types;

pub use engine::ResearchController;
pub use evaluator::ProgressEvaluator;
pub use evidence::{EvidenceStore, Rejection};
pub use planner::ResearchPlanner;
pub use queue::WorkQueue;
pub use service::{ResearchReport, ResearchService, TEST_MODE_REPORT};
pub use sources::{
    append_sources, collect_sources, format_evidence_block, format_sources_section, SourceEntry,
};
pub use strategy::{DepthHeuristic, QueryStrategist};
pub use synthesizer::{ReportSynthesizer, SynthesizedReport};
pub use types::*;

use delve_core::DelveError;
use thiserror::Error;

/// Research-level errors
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Core error: {0}")]
    Core(#[from] DelveError),

    /// A capability failed inside the loop; never retried
    #[error("Research aborted during {phase}: {source}")]
    Aborted {
        phase: ResearchPhase,
        #[source]
        source: DelveError,
    },
}

pub type ResearchResult<T> = Result<T, ResearchError>;

impl ResearchError {
    /// Phase the run was in when it aborted
    pub fn phase(&self) -> Option<ResearchPhase> {
        match self {
            ResearchError::Aborted { phase, .. } => Some(*phase),
            ResearchError::Core(_) => None,
        }
    }

    /// Underlying core error
    pub fn core(&self) -> &DelveError {
        match self {
            ResearchError::Core(error) => error,
            ResearchError::Aborted { source, .. } => source,
        }
    }
}
