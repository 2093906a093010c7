//! Completion-service abstraction shared by every LLM-backed pipeline stage.
//!
//! Stages only see [`CompletionClient`]; the Anthropic transport lives in
//! [`anthropic`] and tests substitute a scripted client.

pub mod anthropic;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

pub use anthropic::AnthropicClient;

/// A role-tagged message with plain string content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

impl PromptMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A tool the model may invoke instead of (or alongside) answering in text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// One completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<PromptMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Offered with `tool_choice: auto` when non-empty
    pub tools: Vec<ToolSchema>,
}

impl CompletionRequest {
    pub fn new(model: &str, system: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.to_string(),
            system: system.into(),
            messages: Vec::new(),
            max_tokens,
            temperature: 0.7,
            tools: Vec::new(),
        }
    }

    pub fn message(mut self, message: PromptMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<PromptMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn tool(mut self, tool: ToolSchema) -> Self {
        self.tools.push(tool);
        self
    }
}

/// A structured tool invocation emitted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// One block of a completion's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolUse(ToolUse),
    #[serde(other)]
    Other,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Text { .. } => "text",
            ContentBlock::ToolUse(_) => "tool_use",
            ContentBlock::Other => "other",
        }
    }
}

/// Result of a completion call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Completion {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl Completion {
    /// Text of the first content block, if that block is text.
    pub fn leading_text(&self) -> Option<&str> {
        match self.content.first() {
            Some(ContentBlock::Text { text }) => Some(text),
            _ => None,
        }
    }

    /// Text of the first text block anywhere in the content.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Block holding the first tool invocation.
    pub fn tool_use_block(&self) -> Option<&ContentBlock> {
        self.content
            .iter()
            .find(|block| matches!(block, ContentBlock::ToolUse(_)))
    }

    pub fn tool_use(&self) -> Option<&ToolUse> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::ToolUse(tool) => Some(tool),
            _ => None,
        })
    }

    pub fn has_tool_use(&self) -> bool {
        self.tool_use().is_some()
    }

    pub fn content_types(&self) -> Vec<&'static str> {
        self.content.iter().map(ContentBlock::kind).collect()
    }
}

/// A text-completion service that can answer with text or a tool call.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}

/// Strip a surrounding markdown code fence from model output.
pub fn strip_code_fence(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
