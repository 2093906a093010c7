//! Request and response payloads for the finance endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chart::ChartSpec;
use crate::llm::PromptMessage;
use crate::{Error, Result};

/// Raw body of `POST /api/finance`.
///
/// Fields stay loose so that shape problems become 400s with a specific
/// message instead of a generic parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceRequest {
    #[serde(default)]
    pub messages: Option<Value>,
    #[serde(default)]
    pub file_data: Option<Value>,
    #[serde(default)]
    pub model: Option<String>,
}

/// One chat message as sent by the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: Value,
}

impl ChatMessage {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                role: map
                    .get("role")
                    .and_then(Value::as_str)
                    .unwrap_or("user")
                    .to_string(),
                content: map.get("content").cloned().unwrap_or(Value::Null),
            },
            other => Self {
                role: "user".to_string(),
                content: other.clone(),
            },
        }
    }

    /// Content as a string; non-string content is serialized.
    pub fn content_text(&self) -> String {
        match &self.content {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn to_prompt(&self) -> PromptMessage {
        PromptMessage {
            role: self.role.clone(),
            content: self.content_text(),
        }
    }
}

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub file_data: Option<Value>,
}

impl ValidatedRequest {
    pub fn latest(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Media type of the attached file, if any.
    pub fn file_media_type(&self) -> Option<&str> {
        self.file_data
            .as_ref()
            .and_then(|f| f.get("mediaType"))
            .and_then(Value::as_str)
    }
}

impl FinanceRequest {
    pub fn validate(self) -> Result<ValidatedRequest> {
        let messages = match self.messages {
            Some(Value::Array(items)) => items,
            _ => return Err(Error::Validation("Messages array is required".to_string())),
        };
        if messages.is_empty() {
            return Err(Error::Validation(
                "Messages array must not be empty".to_string(),
            ));
        }

        let model = match self.model {
            Some(m) if !m.trim().is_empty() => m,
            _ => return Err(Error::Validation("Model selection is required".to_string())),
        };

        Ok(ValidatedRequest {
            messages: messages.iter().map(ChatMessage::from_value).collect(),
            model,
            file_data: self.file_data.filter(|f| !f.is_null()),
        })
    }
}

/// The user's latest message plus today's date, as one prompt string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext(String);

impl QueryContext {
    pub fn new(latest: &ChatMessage, today: DateTime<Utc>) -> Self {
        Self(format!(
            "{}.\n Today's date is {}.\n",
            latest.content_text(),
            today.format("%A, %B %-d, %Y (%Y-%m-%d UTC)")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Body of a successful response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceResponse {
    pub content: String,
    pub has_tool_use: bool,
    pub tool_use: Option<Value>,
    pub chart_data: Option<ChartSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn request(body: Value) -> FinanceRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_validate_requires_messages_array() {
        let err = request(json!({"model": "m1"})).validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Messages array is required");

        let err = request(json!({"messages": "hi", "model": "m1"}))
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = request(json!({"messages": [], "model": "m1"}))
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_validate_requires_model() {
        let err = request(json!({"messages": [{"role": "user", "content": "hi"}]}))
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Model selection is required");

        let err = request(json!({"messages": [{"role": "user", "content": "hi"}], "model": " "}))
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_message_coercion() {
        let validated = request(json!({
            "messages": [
                {"role": "assistant", "content": [{"type": "text", "text": "earlier"}]},
                {"content": "Show me Bitcoin"}
            ],
            "fileData": {"mediaType": "text/csv", "base64": "YQ=="},
            "model": "m1"
        }))
        .validate()
        .unwrap();

        assert_eq!(validated.messages[0].role, "assistant");
        assert_eq!(
            validated.messages[0].content_text(),
            r#"[{"type":"text","text":"earlier"}]"#
        );
        assert_eq!(validated.latest().map(|m| m.role.as_str()), Some("user"));
        assert_eq!(validated.file_media_type(), Some("text/csv"));
    }

    #[test]
    fn test_query_context_appends_date() {
        let message = ChatMessage {
            role: "user".to_string(),
            content: json!("Show me Bitcoin price for the last week"),
        };
        let today = Utc.with_ymd_and_hms(2024, 8, 20, 12, 0, 0).unwrap();
        let context = QueryContext::new(&message, today);
        assert_eq!(
            context.as_str(),
            "Show me Bitcoin price for the last week.\n Today's date is Tuesday, August 20, 2024 (2024-08-20 UTC).\n"
        );
    }

    #[test]
    fn test_response_serializes_camel_case_nulls() {
        let body = serde_json::to_value(FinanceResponse {
            content: String::new(),
            has_tool_use: false,
            tool_use: None,
            chart_data: None,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"content": "", "hasToolUse": false, "toolUse": null, "chartData": null})
        );
    }
}
