//! Scripted capabilities shared by the research integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use delve_core::{DelveResult, Generator, SearchHit, SearchProvider};
use delve_research::prompts::{REPORT_SYSTEM, STRATEGIST_SYSTEM};
use std::sync::{Arc, Mutex};

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Which loop step a generation request belongs to
#[derive(Debug)]
pub enum Call<'a> {
    Plan,
    Evaluate,
    Strategy { item: &'a str },
    Report { prompt: &'a str },
}

fn classify<'a>(prompt: &'a str, system_prompt: &str) -> Call<'a> {
    if system_prompt == REPORT_SYSTEM {
        Call::Report { prompt }
    } else if system_prompt == STRATEGIST_SYSTEM {
        let first_line = prompt.lines().next().unwrap_or_default();
        let item = first_line.split_once(" item: ").map(|(_, t)| t).unwrap_or_default();
        Call::Strategy { item }
    } else if prompt.starts_with("Build a research plan") {
        Call::Plan
    } else {
        Call::Evaluate
    }
}

type GenerateFn = dyn Fn(Call<'_>) -> DelveResult<String> + Send + Sync;

pub struct ScriptedGenerator {
    log: EventLog,
    respond: Box<GenerateFn>,
}

impl ScriptedGenerator {
    pub fn new<F>(log: EventLog, respond: F) -> Arc<Self>
    where
        F: Fn(Call<'_>) -> DelveResult<String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            log,
            respond: Box::new(respond),
        })
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, system_prompt: &str) -> DelveResult<String> {
        let call = classify(prompt, system_prompt);
        let event = match &call {
            Call::Plan => "plan".to_string(),
            Call::Evaluate => "evaluate".to_string(),
            Call::Strategy { item } => format!("strategize:{}", item),
            Call::Report { .. } => "report".to_string(),
        };
        self.log.lock().unwrap().push(event);
        (self.respond)(call)
    }
}

type SearchFn = dyn Fn(&str) -> DelveResult<Vec<SearchHit>> + Send + Sync;

pub struct ScriptedSearch {
    log: EventLog,
    respond: Box<SearchFn>,
}

impl ScriptedSearch {
    pub fn new<F>(log: EventLog, respond: F) -> Arc<Self>
    where
        F: Fn(&str) -> DelveResult<Vec<SearchHit>> + Send + Sync + 'static,
    {
        Arc::new(Self {
            log,
            respond: Box::new(respond),
        })
    }

    /// Search that never finds anything
    pub fn empty(log: EventLog) -> Arc<Self> {
        Self::new(log, |_| Ok(Vec::new()))
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearch {
    async fn search(&self, query: &str) -> DelveResult<Vec<SearchHit>> {
        self.log.lock().unwrap().push(format!("search:{}", query));
        (self.respond)(query)
    }
}

pub fn plan_json(core: &[&str], key: &[&str], info: &[&str]) -> String {
    serde_json::json!({
        "core_concepts": core,
        "key_questions": key,
        "information_requirements": info,
        "research_priorities": []
    })
    .to_string()
}

pub fn progress_json(core: bool, key: bool, info: bool) -> String {
    serde_json::json!({
        "core_concepts": core,
        "key_questions": key,
        "information_requirements": info
    })
    .to_string()
}

pub fn queries_json(queries: &[&str]) -> String {
    serde_json::to_string(queries).unwrap()
}

pub fn hit(title: &str, url: &str, content: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        url: url.to_string(),
        content: content.to_string(),
        published_date: None,
    }
}

pub fn count_prefix(events: &[String], prefix: &str) -> usize {
    events.iter().filter(|e| e.starts_with(prefix)).count()
}
