//! Scripted collaborators for unit tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::llm::{Completion, CompletionClient, CompletionRequest, ContentBlock, ToolUse};
use crate::market::MarketDataSource;
use crate::prompts::CHART_TOOL_NAME;
use crate::{Error, Result};

/// Which pipeline stage issued a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Endpoints,
    Placeholder,
    Relevance,
    Visualization,
}

fn stage_of(request: &CompletionRequest) -> Stage {
    if !request.tools.is_empty() {
        Stage::Visualization
    } else if request.system.contains("fill in placeholders") {
        Stage::Placeholder
    } else if request.system.contains("extracts accurate and relevant information") {
        Stage::Relevance
    } else {
        Stage::Endpoints
    }
}

/// Completion client answering from per-stage queues.
#[derive(Default)]
pub struct ScriptedLlm {
    queues: Mutex<HashMap<Stage, VecDeque<Result<Completion>>>>,
    requests: Mutex<Vec<(Stage, CompletionRequest)>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, stage: Stage, completion: Completion) -> Self {
        self.push(stage, Ok(completion))
    }

    pub fn reply_text(self, stage: Stage, text: &str) -> Self {
        self.reply(stage, text_completion(text))
    }

    pub fn fail(self, stage: Stage, error: Error) -> Self {
        self.push(stage, Err(error))
    }

    fn push(self, stage: Stage, result: Result<Completion>) -> Self {
        self.queues
            .lock()
            .unwrap()
            .entry(stage)
            .or_default()
            .push_back(result);
        self
    }

    pub fn requests(&self, stage: Stage) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == stage)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn calls(&self, stage: Stage) -> usize {
        self.requests(stage).len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedLlm {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let stage = stage_of(request);
        self.requests.lock().unwrap().push((stage, request.clone()));
        self.queues
            .lock()
            .unwrap()
            .get_mut(&stage)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(Error::Internal(format!("no scripted reply for {stage:?}"))))
    }
}

pub fn text_completion(text: &str) -> Completion {
    Completion {
        content: vec![ContentBlock::text(text)],
        stop_reason: Some("end_turn".to_string()),
    }
}

/// A completion carrying commentary plus a chart tool call.
pub fn chart_completion(commentary: &str, input: Value) -> Completion {
    Completion {
        content: vec![
            ContentBlock::text(commentary),
            ContentBlock::ToolUse(ToolUse {
                id: "toolu_01".to_string(),
                name: CHART_TOOL_NAME.to_string(),
                input,
            }),
        ],
        stop_reason: Some("tool_use".to_string()),
    }
}

/// Market data served from a fixed URL table; unknown URLs answer 404.
#[derive(Default)]
pub struct FakeMarket {
    payloads: HashMap<String, Value>,
    fetched: Mutex<Vec<String>>,
}

impl FakeMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, payload: Value) -> Self {
        self.payloads.insert(url.to_string(), payload);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataSource for FakeMarket {
    async fn get_json(&self, url: &str) -> Result<Value> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.payloads
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Fetch(format!("Failed to fetch data from {}: Not Found", url)))
    }
}
