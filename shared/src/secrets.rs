//! AWS Secrets Manager integration for the Anthropic API key.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::config::{ApiKeySource, Config};
use crate::{Error, Result};

/// Cached secrets with lazy initialization.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// JSON shape of a stored API key secret.
#[derive(Debug, Deserialize)]
struct ApiKeySecret {
    #[serde(alias = "ANTHROPIC_API_KEY")]
    api_key: String,
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    // Check cache first
    {
        let cache = get_cache().read().await;
        if let Some(value) = cache.get(secret_arn) {
            return Ok(value.clone());
        }
    }

    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    {
        let mut cache = get_cache().write().await;
        cache.insert(secret_arn.to_string(), secret_string.clone());
    }

    Ok(secret_string)
}

/// Extract the API key from a secret string.
///
/// Accepts either the bare key or a JSON object with an `api_key`
/// (or `ANTHROPIC_API_KEY`) field.
pub fn parse_api_key(secret: &str) -> Result<String> {
    let trimmed = secret.trim();
    if trimmed.starts_with('{') {
        let parsed: ApiKeySecret = serde_json::from_str(trimmed)
            .map_err(|e| Error::Aws(format!("Failed to parse API key secret: {}", e)))?;
        return Ok(parsed.api_key);
    }
    if trimmed.is_empty() {
        return Err(Error::Aws("API key secret is empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Resolve the configured API key, consulting Secrets Manager when needed.
pub async fn resolve_api_key(config: &Config) -> Result<String> {
    match &config.api_key {
        ApiKeySource::Env(key) => Ok(key.clone()),
        ApiKeySource::SecretArn(arn) => {
            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;
            let client = SecretsClient::new(&aws_config);
            let secret = get_secret(&client, arn).await?;
            parse_api_key(&secret)
        }
    }
}
