//! Anthropic Messages API transport.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{Completion, CompletionClient, CompletionRequest, PromptMessage, ToolSchema};
use crate::{Error, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: &'a [PromptMessage],
    #[serde(skip_serializing_if = "<[ToolSchema]>::is_empty")]
    tools: &'a [ToolSchema],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: &'static str,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for `POST /v1/messages`.
pub struct AnthropicClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AnthropicClient {
    /// Create a client with the given key, base URL and per-call timeout.
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|_| Error::Config("API key is not a valid header value".to_string()))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
        })
    }
}

fn request_body(request: &CompletionRequest) -> MessagesRequest<'_> {
    MessagesRequest {
        model: &request.model,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        system: &request.system,
        messages: &request.messages,
        tools: &request.tools,
        tool_choice: (!request.tools.is_empty()).then_some(ToolChoice { choice_type: "auto" }),
    }
}

/// Map a non-success response onto our error kinds.
fn status_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    match status {
        401 => Error::UpstreamAuth(message),
        _ => Error::UpstreamApi { status, message },
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        debug!(model = %request.model, tools = request.tools.len(), "Sending completion request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::UpstreamApi {
                        status: 504,
                        message: "Completion request timed out".to_string(),
                    }
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let completion: Completion = response.json().await?;
        Ok(completion)
    }
}
