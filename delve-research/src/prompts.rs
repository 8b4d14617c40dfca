//! Prompt text for every generation call in a research run

use crate::types::{CompletionStats, ResearchItem, ResearchPlan};

pub const PLANNER_SYSTEM: &str = "You are a research planner. You break a question down into the \
concepts, questions and facts that must be established to answer it well, and you order them so \
that each one builds on the previous.";

pub const STRATEGIST_SYSTEM: &str = "You are a search strategist. You write short, specific web \
search queries that surface authoritative material for one research objective. Queries are plain \
text with no operators or formatting.";

pub const REPORT_SYSTEM: &str = "You are a technical writer producing a well-structured research \
report. You synthesize the supplied evidence according to the research plan into one coherent \
narrative that answers the original question.";

fn plan_json(plan: &ResearchPlan) -> String {
    serde_json::to_string_pretty(plan).unwrap_or_default()
}

pub fn plan_prompt(query: &str) -> String {
    format!(
        r#"Build a research plan for this query: {query}

Respond with a single JSON object of this shape:
{{
    "core_concepts": ["fundamental concepts the reader must understand"],
    "key_questions": ["specific questions the report has to answer"],
    "information_requirements": ["concrete facts or data needed for those answers"],
    "research_priorities": ["the order in which the topics should be covered"]
}}

Every entry should contribute directly to answering the query."#
    )
}

pub fn evaluation_prompt(plan: &ResearchPlan, evidence: &[&str]) -> String {
    format!(
        r#"Judge whether the evidence gathered so far is enough for each part of the research plan.

Research plan:
{plan}

Evidence gathered:
{evidence}

Respond with a single JSON object:
{{
    "core_concepts": true or false,
    "key_questions": true or false,
    "information_requirements": true or false
}}
Answer true for a part only when the evidence covers it adequately."#,
        plan = plan_json(plan),
        evidence = evidence.join("\n"),
    )
}

pub fn strategy_prompt(item: &ResearchItem, gathered_titles: &[&str]) -> String {
    let gathered = if gathered_titles.is_empty() {
        "(nothing yet)".to_string()
    } else {
        gathered_titles
            .iter()
            .map(|t| format!("- {}", t))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"Write 2-3 web search queries for this {category} item: {text}

Aim the queries at {focus}.

Sources already collected:
{gathered}

Respond with only a JSON array of plain query strings, for example:
["what is a borrow checker", "rust borrow checker explained", "borrow checker lifetimes examples"]"#,
        category = item.category,
        text = item.text,
        focus = item.category.search_focus(),
    )
}

pub fn report_prompt(
    query: &str,
    plan: &ResearchPlan,
    evidence_blocks: &[String],
    stats: &CompletionStats,
) -> String {
    let coverage = serde_json::to_string(&stats.research_coverage).unwrap_or_default();
    format!(
        r#"Query: {query}

Research plan:
{plan}

Research statistics:
- searches performed: {searches}
- unique sources: {sources}
- coverage at last evaluation: {coverage}

Research findings:
{findings}

Write a comprehensive technical report that:
1. Follows the structure of the research plan
2. Explains every core concept thoroughly
3. Answers each key question
4. Gives detailed analysis backed by the information requirements
5. Uses section headings ordered by the research priorities
6. Weaves the findings into one coherent narrative
7. Supports claims with specific evidence from the sources
8. Calls out gaps or open uncertainties that remain

Use clear markdown headings and keep the argument flowing logically."#,
        plan = plan_json(plan),
        searches = stats.total_searches,
        sources = stats.unique_sources,
        findings = evidence_blocks.join("\n"),
    )
}
