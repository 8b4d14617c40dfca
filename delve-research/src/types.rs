//! Research loop data model

use delve_core::Document;
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// One of the three plan categories that drive searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum Category {
    CoreConcepts,
    KeyQuestions,
    InformationRequirements,
}

impl Category {
    /// Actionable categories in priority order
    pub const ALL: [Category; 3] = [
        Category::CoreConcepts,
        Category::KeyQuestions,
        Category::InformationRequirements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CoreConcepts => "core_concepts",
            Category::KeyQuestions => "key_questions",
            Category::InformationRequirements => "information_requirements",
        }
    }

    /// Search guidance handed to the strategist for this kind of item
    pub fn search_focus(&self) -> &'static str {
        match self {
            Category::CoreConcepts => "definitions, explanations and foundational understanding",
            Category::KeyQuestions => "specific answers and concrete examples",
            Category::InformationRequirements => "detailed technical information and data",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured decomposition of a query; immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ResearchPlan {
    pub core_concepts: Vec<String>,
    pub key_questions: Vec<String>,
    pub information_requirements: Vec<String>,
    /// Ordering hint for the synthesizer only
    #[serde(default)]
    pub research_priorities: Vec<String>,
}

impl ResearchPlan {
    /// Plan used when the model output cannot be parsed: the query in every category
    pub fn degenerate(query: &str) -> Self {
        Self {
            core_concepts: vec![query.to_string()],
            key_questions: vec![query.to_string()],
            information_requirements: vec![query.to_string()],
            research_priorities: vec![query.to_string()],
        }
    }

    pub fn items(&self, category: Category) -> &[String] {
        match category {
            Category::CoreConcepts => &self.core_concepts,
            Category::KeyQuestions => &self.key_questions,
            Category::InformationRequirements => &self.information_requirements,
        }
    }
}

/// One unit of research need; identity is (category, text)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResearchItem {
    pub category: Category,
    pub text: String,
}

impl ResearchItem {
    pub fn new(category: Category, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }

    /// Lowercase whitespace tokens of the item text
    pub fn tokens(&self) -> Vec<String> {
        self.text
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Display for ResearchItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.text)
    }
}

/// Per-category coverage flags; always replaced wholesale
///
/// Deserialization is strict: all three keys must be present and boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProgressRecord {
    pub core_concepts: bool,
    pub key_questions: bool,
    pub information_requirements: bool,
}

impl ProgressRecord {
    /// Fail-closed record
    pub fn all_false() -> Self {
        Self::default()
    }

    pub fn is_met(&self, category: Category) -> bool {
        match category {
            Category::CoreConcepts => self.core_concepts,
            Category::KeyQuestions => self.key_questions,
            Category::InformationRequirements => self.information_requirements,
        }
    }

    pub fn is_complete(&self) -> bool {
        Category::ALL.iter().all(|c| self.is_met(*c))
    }
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResearchPhase {
    Planning,
    Evaluating,
    Strategizing,
    Searching,
    Done,
    Aborted,
}

impl ResearchPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResearchPhase::Done | ResearchPhase::Aborted)
    }
}

impl fmt::Display for ResearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResearchPhase::Planning => "PLANNING",
            ResearchPhase::Evaluating => "EVALUATING",
            ResearchPhase::Strategizing => "STRATEGIZING",
            ResearchPhase::Searching => "SEARCHING",
            ResearchPhase::Done => "DONE",
            ResearchPhase::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

/// Why the loop reached DONE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum TerminationReason {
    /// Every category was judged covered
    Complete,
    /// Nothing unmet was left after the depth filter
    NoRemainingItems,
    /// The global search ceiling was reached
    BudgetExhausted,
    /// A whole pass skipped every item on the attempt cap
    AttemptsExhausted,
}

/// Coverage statistics handed to the synthesizer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CompletionStats {
    pub total_searches: usize,
    pub unique_sources: usize,
    /// Most recent evaluation performed
    pub research_coverage: ProgressRecord,
    pub evaluations: usize,
    /// Set when searches ran after `research_coverage` was computed
    pub coverage_is_stale: bool,
}

/// Everything the loop produced for one query
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    pub query: String,
    pub plan: ResearchPlan,
    pub evidence: Vec<Document>,
    pub stats: CompletionStats,
    pub termination: TerminationReason,
    /// Phase transitions in the order they happened
    pub phases: Vec<ResearchPhase>,
}
