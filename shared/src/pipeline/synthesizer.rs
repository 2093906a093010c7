//! Natural-language query → market-data endpoint URLs.

use serde_json::Value;
use tracing::{info, warn};

use crate::llm::{strip_code_fence, CompletionClient, CompletionRequest, PromptMessage};
use crate::models::QueryContext;
use crate::prompts;
use crate::{Error, Result};

const MAX_TOKENS: u32 = 500;

/// Ask the model which endpoints answer `query`.
///
/// Fails with [`Error::Parse`] when the first content block is not a JSON
/// array of strings; callers treat that as "no endpoints".
pub async fn synthesize_endpoints(
    llm: &dyn CompletionClient,
    query: &QueryContext,
    model: &str,
    base_url: &str,
) -> Result<Vec<String>> {
    let request = CompletionRequest::new(model, prompts::endpoint_system_prompt(base_url), MAX_TOKENS)
        .message(PromptMessage::user(query.as_str()));

    let completion = llm.complete(&request).await?;
    let text = completion
        .leading_text()
        .ok_or_else(|| Error::Parse("First content block is not text".to_string()))?;

    let endpoints = parse_endpoint_list(text, base_url)?;
    info!(count = endpoints.len(), ?endpoints, "Parsed endpoints");
    Ok(endpoints)
}

/// Parse model output into endpoint strings under `base_url`.
///
/// Entries outside the base are dropped so every returned endpoint
/// targets the market-data API.
pub fn parse_endpoint_list(text: &str, base_url: &str) -> Result<Vec<String>> {
    let parsed: Value = serde_json::from_str(strip_code_fence(text)).map_err(|e| {
        Error::Parse(format!("Failed to parse endpoints from LLM response: {}", e))
    })?;

    let items = parsed
        .as_array()
        .ok_or_else(|| Error::Parse(format!("Expected an array of endpoint strings: {}", parsed)))?;

    let mut endpoints = Vec::with_capacity(items.len());
    for item in items {
        let endpoint = item
            .as_str()
            .ok_or_else(|| Error::Parse(format!("Expected an array of endpoint strings: {}", parsed)))?
            .trim();

        if is_under_base(endpoint, base_url) {
            endpoints.push(endpoint.to_string());
        } else {
            warn!(endpoint, "Dropping endpoint outside the market-data base URL");
        }
    }

    Ok(endpoints)
}

/// Whether `endpoint` points at `base_url` or a path below it.
pub(crate) fn is_under_base(endpoint: &str, base_url: &str) -> bool {
    let base = base_url.trim_end_matches('/');
    endpoint
        .strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(|c: char| c == '/' || c == '?'))
}
