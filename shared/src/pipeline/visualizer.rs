//! Final completion that turns the dataset into a chart tool call.

use tracing::info;

use super::fetcher::ConsolidatedDataset;
use crate::llm::{Completion, CompletionClient, CompletionRequest, PromptMessage};
use crate::models::{ChatMessage, QueryContext};
use crate::prompts;
use crate::Result;

const MAX_TOKENS: u32 = 4096;

/// Send history plus dataset to the model with the chart tool attached.
///
/// Upstream auth and API errors propagate unchanged so the handler can
/// map them to 401 / passthrough statuses.
pub async fn synthesize_visualization(
    llm: &dyn CompletionClient,
    history: &[ChatMessage],
    dataset: &ConsolidatedDataset,
    query: &QueryContext,
    model: &str,
) -> Result<Completion> {
    let mut messages: Vec<PromptMessage> = history.iter().map(ChatMessage::to_prompt).collect();
    messages.push(PromptMessage::user(prompts::visualization_data_prompt(
        query.as_str(),
        &dataset.to_value(),
    )));

    let request = CompletionRequest::new(model, prompts::VISUALIZATION_SYSTEM_PROMPT, MAX_TOKENS)
        .messages(messages)
        .tool(prompts::chart_tool());

    let completion = llm.complete(&request).await?;

    info!(
        stop_reason = ?completion.stop_reason,
        has_tool_use = completion.has_tool_use(),
        content_types = ?completion.content_types(),
        text_length = completion.leading_text().map(str::len).unwrap_or(0),
        "Visualization response received"
    );

    Ok(completion)
}
