//! Fills `{placeholder}` path segments from the previous payload.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::info;

use crate::llm::{strip_code_fence, CompletionClient, CompletionRequest, PromptMessage};
use crate::prompts;
use crate::{Error, Result};

const MAX_TOKENS: u32 = 100;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder_pattern() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("valid placeholder pattern"))
}

/// Whether `endpoint` still contains a `{word}` segment.
pub fn has_placeholder(endpoint: &str) -> bool {
    placeholder_pattern().is_match(endpoint)
}

/// Names of the unresolved placeholders, in order.
pub fn placeholder_names(endpoint: &str) -> Vec<&str> {
    placeholder_pattern()
        .captures_iter(endpoint)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Ask the model to substitute placeholders using `previous`.
///
/// Only the first text block of the completion is used.
pub async fn resolve_placeholders(
    llm: &dyn CompletionClient,
    endpoint: &str,
    previous: &Value,
    model: &str,
) -> Result<String> {
    let request = CompletionRequest::new(
        model,
        prompts::placeholder_system_prompt(endpoint, previous),
        MAX_TOKENS,
    )
    .message(PromptMessage::user(prompts::PLACEHOLDER_USER_PROMPT));

    let completion = llm.complete(&request).await?;
    let text = completion
        .first_text()
        .ok_or_else(|| Error::Parse(format!("No text block while resolving {}", endpoint)))?;

    let resolved = clean_endpoint(text)
        .ok_or_else(|| Error::Parse(format!("Empty resolution for {}", endpoint)))?;

    info!(template = endpoint, resolved = %resolved, "Resolved endpoint placeholders");
    Ok(resolved)
}

/// First non-empty line of the reply with quoting stripped.
fn clean_endpoint(text: &str) -> Option<String> {
    strip_code_fence(text)
        .lines()
        .map(|line| line.trim().trim_matches(|c: char| c == '"' || c == '\'' || c == '`').trim())
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Completion, ContentBlock};
    use crate::testing::{ScriptedLlm, Stage};
    use serde_json::json;

    #[test]
    fn test_has_placeholder() {
        assert!(has_placeholder("https://api.example/v3/coins/{id}/history"));
        assert!(!has_placeholder("https://api.example/v3/coins/bitcoin/history"));
        assert!(!has_placeholder("https://api.example/v3/search?query={}"));
        assert_eq!(
            placeholder_names("/coins/{id}/contract/{contract_address}"),
            vec!["id", "contract_address"]
        );
    }

    #[test]
    fn test_clean_endpoint() {
        assert_eq!(
            clean_endpoint("  \"https://a/v3/coins/bitcoin\"  ").as_deref(),
            Some("https://a/v3/coins/bitcoin")
        );
        assert_eq!(
            clean_endpoint("```\nhttps://a/v3/coins/eth\n```").as_deref(),
            Some("https://a/v3/coins/eth")
        );
        assert_eq!(clean_endpoint("  \n "), None);
    }

    #[tokio::test]
    async fn test_resolves_id_from_previous_payload() {
        let llm = ScriptedLlm::new().reply_text(
            Stage::Placeholder,
            "https://api.example/v3/coins/bitcoin/history",
        );

        let resolved = resolve_placeholders(
            &llm,
            "https://api.example/v3/coins/{id}/history",
            &json!({"id": "bitcoin"}),
            "m1",
        )
        .await
        .unwrap();

        assert!(resolved.contains("bitcoin"));
        assert!(!has_placeholder(&resolved));

        let request = &llm.requests(Stage::Placeholder)[0];
        assert_eq!(request.max_tokens, 100);
        assert!(request.system.contains(r#"Previous Data: {"id":"bitcoin"}"#));
    }

    #[tokio::test]
    async fn test_uses_text_block_not_whole_content() {
        let llm = ScriptedLlm::new().reply(
            Stage::Placeholder,
            Completion {
                content: vec![
                    ContentBlock::Other,
                    ContentBlock::text("https://api.example/v3/coins/ethereum"),
                ],
                stop_reason: None,
            },
        );

        let resolved = resolve_placeholders(&llm, "https://api.example/v3/coins/{id}", &json!({}), "m1")
            .await
            .unwrap();
        assert_eq!(resolved, "https://api.example/v3/coins/ethereum");
    }

    #[tokio::test]
    async fn test_missing_text_is_parse_error() {
        let llm = ScriptedLlm::new().reply(Stage::Placeholder, Completion::default());
        let result = resolve_placeholders(&llm, "https://x/{id}", &json!({}), "m1").await;
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
