//! Research loop controller behavior with scripted capabilities

mod common;

use common::*;
use delve_core::{BudgetConfig, DelveError};
use delve_research::{
    ResearchController, ResearchError, ResearchPhase, ResearchPlan, TerminationReason,
};

fn controller(
    generator: std::sync::Arc<ScriptedGenerator>,
    search: std::sync::Arc<ScriptedSearch>,
) -> ResearchController {
    ResearchController::new(generator, search, BudgetConfig::default())
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok(plan_json(&["A"], &["B"], &["C"])),
        Call::Evaluate => Ok(progress_json(false, false, false)),
        Call::Strategy { item: "A" } => Ok(queries_json(&["A1", "A2"])),
        Call::Strategy { item } => Ok(queries_json(&[&format!("{}1", item)])),
        Call::Report { .. } => Ok("report".to_string()),
    });
    let body = format!("Alpha {}", "a".repeat(344));
    assert_eq!(body.chars().count(), 350);
    let search = ScriptedSearch::new(log.clone(), move |query| {
        Ok(if query == "A1" {
            vec![hit("Alpha", "u1", &body)]
        } else {
            Vec::new()
        })
    });

    let outcome = controller(generator, search).run("X").await.unwrap();
    let events = events(&log);

    assert_eq!(
        &events[..6],
        &[
            "plan",
            "evaluate",
            "strategize:A",
            "search:A1",
            "search:A2",
            "strategize:B",
        ]
    );
    assert_eq!(outcome.evidence.len(), 1);
    assert_eq!(outcome.evidence[0].url, "u1");
    assert_eq!(outcome.plan.research_priorities, Vec::<String>::new());
}

#[tokio::test]
async fn test_attempt_cap_ends_the_run() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok(plan_json(&["A"], &["B"], &["C"])),
        Call::Evaluate => Ok(progress_json(false, false, false)),
        Call::Strategy { item } => Ok(queries_json(&[item])),
        Call::Report { .. } => Ok(String::new()),
    });
    let search = ScriptedSearch::empty(log.clone());

    let outcome = controller(generator, search).run("X").await.unwrap();
    let events = events(&log);

    for item in ["A", "B", "C"] {
        assert_eq!(
            count_prefix(&events, &format!("strategize:{}", item)),
            2,
            "item {} should be strategized exactly twice",
            item
        );
    }
    assert_eq!(outcome.termination, TerminationReason::AttemptsExhausted);
    assert_eq!(outcome.stats.total_searches, 6);
    assert_eq!(outcome.stats.evaluations, 3);
    assert!(!outcome.stats.coverage_is_stale);
}

#[tokio::test]
async fn test_global_search_budget_is_never_exceeded() {
    let log = event_log();
    let concepts: Vec<String> = (0..20).map(|i| format!("concept{}", i)).collect();
    let plan = serde_json::json!({
        "core_concepts": concepts,
        "key_questions": ["k"],
        "information_requirements": ["i"],
    })
    .to_string();
    let generator = ScriptedGenerator::new(log.clone(), move |call| match call {
        Call::Plan => Ok(plan.clone()),
        Call::Evaluate => Ok(progress_json(false, false, false)),
        Call::Strategy { item } => Ok(queries_json(&[
            &format!("{} one", item),
            &format!("{} two", item),
            &format!("{} three", item),
        ])),
        Call::Report { .. } => Ok(String::new()),
    });
    let search = ScriptedSearch::empty(log.clone());

    let outcome = controller(generator, search).run("X").await.unwrap();
    let events = events(&log);

    assert_eq!(count_prefix(&events, "search:"), 30);
    assert_eq!(outcome.stats.total_searches, 30);
    assert_eq!(outcome.termination, TerminationReason::BudgetExhausted);
    assert!(outcome.stats.coverage_is_stale);
    // Budget stops the pass immediately: no strategist call after the last search
    assert!(events.last().unwrap().starts_with("search:"));
    assert_eq!(count_prefix(&events, "evaluate"), 1);
}

#[tokio::test]
async fn test_configured_budget_is_honored() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok(plan_json(&["A", "B"], &["C"], &["D"])),
        Call::Evaluate => Ok(progress_json(false, false, false)),
        Call::Strategy { item } => Ok(queries_json(&[
            &format!("{} x", item),
            &format!("{} y", item),
        ])),
        Call::Report { .. } => Ok(String::new()),
    });
    let search = ScriptedSearch::empty(log.clone());
    let budget = BudgetConfig {
        max_searches_total: 3,
        ..BudgetConfig::default()
    };

    let outcome = ResearchController::new(generator, search, budget)
        .run("X")
        .await
        .unwrap();

    assert_eq!(outcome.stats.total_searches, 3);
    assert_eq!(
        events(&log).iter().filter(|e| e.starts_with("search:")).cloned().collect::<Vec<_>>(),
        vec!["search:A x", "search:A y", "search:B x"]
    );
}

#[tokio::test]
async fn test_priority_order_across_categories() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok(plan_json(&["c1", "c2"], &["k1", "k2"], &["i1"])),
        Call::Evaluate => Ok(progress_json(false, false, false)),
        Call::Strategy { .. } => Ok("[]".to_string()),
        Call::Report { .. } => Ok(String::new()),
    });
    let search = ScriptedSearch::empty(log.clone());

    controller(generator, search).run("X").await.unwrap();

    let strategized: Vec<String> = events(&log)
        .into_iter()
        .filter_map(|e| e.strip_prefix("strategize:").map(str::to_string))
        .collect();
    assert_eq!(&strategized[..5], &["c1", "c2", "k1", "k2", "i1"]);
}

#[tokio::test]
async fn test_met_categories_are_not_searched() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok(plan_json(&["c"], &["k"], &["i"])),
        Call::Evaluate => Ok(progress_json(true, false, true)),
        Call::Strategy { item } => Ok(queries_json(&[item])),
        Call::Report { .. } => Ok(String::new()),
    });
    let search = ScriptedSearch::empty(log.clone());

    controller(generator, search).run("X").await.unwrap();

    let events = events(&log);
    assert_eq!(count_prefix(&events, "strategize:c"), 0);
    assert_eq!(count_prefix(&events, "strategize:i"), 0);
    assert_eq!(count_prefix(&events, "strategize:k"), 2);
}

#[tokio::test]
async fn test_complete_on_first_evaluation() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok(plan_json(&["c"], &["k"], &["i"])),
        Call::Evaluate => Ok(format!("```json\n{}\n```", progress_json(true, true, true))),
        _ => panic!("no strategy or report expected"),
    });
    let search = ScriptedSearch::empty(log.clone());

    let outcome = controller(generator, search).run("X").await.unwrap();

    assert_eq!(outcome.termination, TerminationReason::Complete);
    assert_eq!(outcome.stats.total_searches, 0);
    assert!(outcome.stats.research_coverage.is_complete());
    assert_eq!(
        outcome.phases,
        vec![ResearchPhase::Planning, ResearchPhase::Evaluating, ResearchPhase::Done]
    );
}

#[tokio::test]
async fn test_unparseable_plan_falls_back_to_query() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok("I would love to help with that!".to_string()),
        Call::Evaluate => Ok(progress_json(false, false, false)),
        Call::Strategy { .. } => Ok("not a list".to_string()),
        Call::Report { .. } => Ok(String::new()),
    });
    let search = ScriptedSearch::empty(log.clone());

    let outcome = controller(generator, search).run("rust async").await.unwrap();

    assert_eq!(outcome.plan, ResearchPlan::degenerate("rust async"));
    let events = events(&log);
    // Same text in three categories counts as three distinct items
    assert_eq!(count_prefix(&events, "strategize:rust async"), 6);
    // Strategy fallback searches the item text itself
    assert_eq!(count_prefix(&events, "search:rust async"), 6);
}

#[tokio::test]
async fn test_malformed_progress_fails_closed() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok(plan_json(&["c"], &[], &[])),
        Call::Evaluate => Ok(
            r#"{"core_concepts": true, "key_questions": "yes", "information_requirements": true}"#
                .to_string(),
        ),
        Call::Strategy { item } => Ok(queries_json(&[item])),
        Call::Report { .. } => Ok(String::new()),
    });
    let search = ScriptedSearch::empty(log.clone());

    let outcome = controller(generator, search).run("X").await.unwrap();

    assert_eq!(count_prefix(&events(&log), "strategize:c"), 2);
    assert_eq!(
        outcome.stats.research_coverage,
        delve_research::ProgressRecord::all_false()
    );
}

#[tokio::test]
async fn test_item_stops_after_enough_detailed_results() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok(plan_json(&["tokio"], &[], &[])),
        Call::Evaluate => Ok(progress_json(false, true, true)),
        Call::Strategy { .. } => Ok(queries_json(&["q1", "q2", "q3"])),
        Call::Report { .. } => Ok(String::new()),
    });
    let body = format!("tokio {}", "x".repeat(245));
    let search = ScriptedSearch::new(log.clone(), move |query| {
        Ok((0..3)
            .map(|i| hit("t", &format!("{}-{}", query, i), &body))
            .collect())
    });

    controller(generator, search).run("X").await.unwrap();

    let events = events(&log);
    let first_attempt: Vec<_> = events
        .iter()
        .skip_while(|e| !e.starts_with("strategize:"))
        .skip(1)
        .take_while(|e| e.starts_with("search:"))
        .collect();
    assert_eq!(first_attempt, vec!["search:q1"]);
}

#[tokio::test]
async fn test_short_results_do_not_stop_the_item() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok(plan_json(&["tokio"], &[], &[])),
        Call::Evaluate => Ok(progress_json(false, true, true)),
        Call::Strategy { .. } => Ok(queries_json(&["q1", "  ", "q2"])),
        Call::Report { .. } => Ok(String::new()),
    });
    // 150 chars: admitted, but not detailed enough to stop early
    let body = format!("tokio {}", "x".repeat(144));
    let search = ScriptedSearch::new(log.clone(), move |query| {
        Ok((0..3)
            .map(|i| hit("t", &format!("{}-{}", query, i), &body))
            .collect())
    });

    let outcome = controller(generator, search).run("X").await.unwrap();

    let events = events(&log);
    let first_attempt: Vec<_> = events
        .iter()
        .skip_while(|e| !e.starts_with("strategize:"))
        .skip(1)
        .take_while(|e| e.starts_with("search:"))
        .collect();
    // Whitespace-only query is skipped without spending budget
    assert_eq!(first_attempt, vec!["search:q1", "search:q2"]);
    // Second attempt sees the same URLs again
    assert_eq!(outcome.evidence.len(), 6);
}

#[tokio::test]
async fn test_sufficiently_deep_items_leave_the_queue() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok(plan_json(&["memory safety"], &["ownership rules"], &[])),
        Call::Evaluate => Ok(progress_json(false, false, true)),
        Call::Strategy { item } => Ok(queries_json(&[item])),
        Call::Report { .. } => Ok(String::new()),
    });
    let deep = format!("Memory safety without a garbage collector. {}", "m".repeat(300));
    let search = ScriptedSearch::new(log.clone(), move |query| {
        Ok(if query == "memory safety" {
            vec![hit("one", "https://a", &deep), hit("two", "https://b", &deep)]
        } else {
            Vec::new()
        })
    });

    controller(generator, search).run("X").await.unwrap();

    let strategized: Vec<String> = events(&log)
        .into_iter()
        .filter(|e| e.starts_with("strategize:"))
        .collect();
    assert_eq!(
        strategized,
        vec![
            "strategize:memory safety",
            "strategize:ownership rules",
            "strategize:ownership rules",
        ]
    );
}

#[tokio::test]
async fn test_search_failure_aborts_without_retry() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok(plan_json(&["c"], &["k"], &["i"])),
        Call::Evaluate => Ok(progress_json(false, false, false)),
        Call::Strategy { item } => Ok(queries_json(&[item, "second"])),
        Call::Report { .. } => Ok(String::new()),
    });
    let search = ScriptedSearch::new(log.clone(), |_| Err(DelveError::search("HTTP 500", "test")));

    let error = controller(generator, search).run("X").await.unwrap_err();

    assert_eq!(error.phase(), Some(ResearchPhase::Searching));
    assert!(matches!(
        error,
        ResearchError::Aborted { source: DelveError::Search { .. }, .. }
    ));
    assert_eq!(count_prefix(&events(&log), "search:"), 1);
}

#[tokio::test]
async fn test_generation_failure_reports_its_phase() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok(plan_json(&["c"], &["k"], &["i"])),
        Call::Evaluate => Err(DelveError::generation("quota exceeded", "test")),
        _ => Ok(String::new()),
    });
    let search = ScriptedSearch::empty(log.clone());

    let error = controller(generator, search).run("X").await.unwrap_err();
    assert_eq!(error.phase(), Some(ResearchPhase::Evaluating));
    assert!(error.core().is_fatal_to_run());

    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |_| {
        Err(DelveError::generation("offline", "test"))
    });
    let error = controller(generator, ScriptedSearch::empty(log))
        .run("X")
        .await
        .unwrap_err();
    assert_eq!(error.phase(), Some(ResearchPhase::Planning));
}

#[tokio::test]
async fn test_empty_query_is_rejected_before_any_call() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |_| Ok(String::new()));
    let search = ScriptedSearch::empty(log.clone());

    let error = controller(generator, search).run("   ").await.unwrap_err();

    assert!(matches!(
        error,
        ResearchError::Core(DelveError::Validation { .. })
    ));
    assert!(events(&log).is_empty());
}

#[tokio::test]
async fn test_items_are_counted_per_category() {
    let log = event_log();
    let generator = ScriptedGenerator::new(log.clone(), |call| match call {
        Call::Plan => Ok(plan_json(&["shared"], &["shared"], &[])),
        Call::Evaluate => Ok(progress_json(false, false, true)),
        Call::Strategy { item } => Ok(queries_json(&[item])),
        Call::Report { .. } => Ok(String::new()),
    });
    let search = ScriptedSearch::empty(log.clone());

    let outcome = controller(generator, search).run("X").await.unwrap();

    assert_eq!(count_prefix(&events(&log), "strategize:shared"), 4);
    assert_eq!(outcome.stats.total_searches, 4);
}
