//! Optional stage that trims a payload to the fields a query needs.

use chrono::{DateTime, SecondsFormat};
use serde_json::{json, Value};
use tracing::warn;

use crate::llm::{strip_code_fence, CompletionClient, CompletionRequest, PromptMessage};
use crate::models::QueryContext;
use crate::prompts;

const MAX_TOKENS: u32 = 500;

/// Smallest millisecond value treated as a timestamp (early 1973).
const MIN_TIMESTAMP_MS: f64 = 1e11;

/// Reduce `data` to what `query` and `endpoint` call for.
///
/// Never fails: an unusable reply yields `data` unchanged.
pub async fn extract_relevant(
    llm: &dyn CompletionClient,
    data: &Value,
    query: &QueryContext,
    endpoint: &str,
    model: &str,
) -> Value {
    let request = CompletionRequest::new(model, prompts::RELEVANCE_SYSTEM_PROMPT, MAX_TOKENS)
        .message(PromptMessage::user(prompts::relevance_user_prompt(
            query.as_str(),
            endpoint,
            data,
        )));

    let completion = match llm.complete(&request).await {
        Ok(completion) => completion,
        Err(e) => {
            warn!(endpoint, error = %e, "Relevance extraction failed, keeping original data");
            return data.clone();
        }
    };

    let parsed = completion
        .leading_text()
        .and_then(|text| serde_json::from_str::<Value>(strip_code_fence(text)).ok());

    match parsed {
        Some(extracted) => normalize_timestamp_series(extracted),
        None => {
            warn!(endpoint, "Could not parse relevant data from LLM response, keeping original data");
            data.clone()
        }
    }
}

/// Rewrite `[[timestamp_ms, value], ...]` series as
/// `[{"timestamp": "<RFC 3339>", "value": value}, ...]`, recursively.
pub fn normalize_timestamp_series(value: Value) -> Value {
    match value {
        Value::Array(items) => {
            if !items.is_empty() && items.iter().all(|item| timestamp_pair(item).is_some()) {
                items
                    .iter()
                    .filter_map(timestamp_pair)
                    .map(|(timestamp, value)| json!({"timestamp": timestamp, "value": value}))
                    .collect()
            } else {
                Value::Array(items.into_iter().map(normalize_timestamp_series).collect())
            }
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_timestamp_series(v)))
                .collect(),
        ),
        other => other,
    }
}

fn timestamp_pair(item: &Value) -> Option<(String, Value)> {
    let pair = item.as_array().filter(|a| a.len() == 2)?;
    let ms = pair[0].as_f64().filter(|ms| ms.is_finite() && *ms >= MIN_TIMESTAMP_MS)?;
    if !pair[1].is_number() {
        return None;
    }
    let timestamp = DateTime::from_timestamp_millis(ms as i64)?;
    Some((
        timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        pair[1].clone(),
    ))
}
