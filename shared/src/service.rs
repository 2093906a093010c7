//! Request handling for `POST /api/finance`, independent of the Lambda runtime.

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::models::FinanceRequest;
use crate::pipeline::FinancePipeline;
use crate::Error;

/// Status and JSON body to send back.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Option<Value>,
    /// Whether to mark the response `Cache-Control: no-cache`
    pub no_cache: bool,
}

impl Reply {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
            no_cache: false,
        }
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            body: None,
            no_cache: false,
        }
    }
}

/// Error body for each failure kind.
pub fn error_reply(err: &Error) -> Reply {
    let body = match err {
        Error::Validation(message) => json!({ "error": message }),
        Error::UpstreamAuth(_) => json!({
            "error": "Authentication Error",
            "details": "Invalid API key or authentication failed",
        }),
        Error::UpstreamApi { status, message } => json!({
            "error": "API Error",
            "details": message,
            "code": status,
        }),
        other => json!({ "error": other.to_string() }),
    };
    Reply::json(err.status_code(), body)
}

pub struct FinanceService {
    pipeline: FinancePipeline,
}

impl FinanceService {
    pub fn new(pipeline: FinancePipeline) -> Self {
        Self { pipeline }
    }

    /// Handle one HTTP call.
    pub async fn handle(&self, method: &str, body: &[u8]) -> Reply {
        match method {
            "POST" => {}
            "OPTIONS" => return Reply::empty(204),
            _ => return Reply::json(405, json!({ "error": "Method not allowed" })),
        }

        match self.handle_post(body).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, status = e.status_code(), "Finance API error");
                error_reply(&e)
            }
        }
    }

    async fn handle_post(&self, body: &[u8]) -> Result<Reply, Error> {
        let request: FinanceRequest = serde_json::from_slice(body)
            .map_err(|e| Error::Validation(format!("Invalid request body: {}", e)))?;

        info!(
            has_messages = request.messages.is_some(),
            message_count = request.messages.as_ref().and_then(serde_json::Value::as_array).map(Vec::len),
            has_file_data = request.file_data.as_ref().is_some_and(|f| !f.is_null()),
            model = ?request.model,
            "Initial request data"
        );

        let request = request.validate()?;
        if let Some(media_type) = request.file_media_type() {
            info!(media_type, "File data attached, not forwarded to the pipeline");
        }

        let response = self.pipeline.run(&request, Utc::now()).await?;

        Ok(Reply {
            status: 200,
            body: Some(serde_json::to_value(&response)?),
            no_cache: true,
        })
    }
}
